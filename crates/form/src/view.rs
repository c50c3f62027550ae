use model::Feedback;
use std::collections::BTreeSet;

pub const QUEST: &str = "quest-value";
pub const ARTWORK: &str = "artwork-value";
pub const OVERALL: &str = "overall-value";
pub const QUALITY: &str = "quality-value";
pub const REASON_TO_BUY: &str = "reason-to-buy";
pub const OPTIONAL: &str = "optional";
pub const FORM_PANEL: &str = "feedback-form";
pub const THANK_YOU_PANEL: &str = "feedback-thank-you";

pub const WAS_VALIDATED: &str = "was-validated";
pub const D_NONE: &str = "d-none";
pub const D_FLEX: &str = "d-flex";
pub const SHOW: &str = "show";
pub const HIDE: &str = "hide";

/// Presentation classes attached to a single element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassList(BTreeSet<&'static str>);

impl ClassList {
    pub fn add(&mut self, class: &'static str) {
        self.0.insert(class);
    }

    pub fn remove(&mut self, class: &str) {
        self.0.remove(class);
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.contains(class)
    }
}

impl<const N: usize> From<[&'static str; N]> for ClassList {
    fn from(classes: [&'static str; N]) -> Self {
        Self(classes.into())
    }
}

/// A region of the page that is toggled purely through its classes.
#[derive(Clone, Debug)]
pub struct Panel {
    pub id: &'static str,
    pub classes: ClassList,
}

impl Panel {
    pub fn new(id: &'static str, classes: ClassList) -> Self {
        Self { id, classes }
    }

    pub fn is_visible(&self) -> bool {
        !self.classes.contains(D_NONE) && !self.classes.contains(HIDE)
    }
}

/// A group of mutually exclusive options answering one question. Since the selection is
/// stored as a single index, at most one option can ever be checked.
#[derive(Clone, Debug)]
pub struct RatingGroup {
    pub name: &'static str,
    pub required: bool,
    options: Box<[u8]>,
    checked: Option<usize>,
}

impl RatingGroup {
    pub fn new(name: &'static str, options: impl IntoIterator<Item = u8>) -> Self {
        Self { name, required: false, options: options.into_iter().collect(), checked: None }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn options(&self) -> &[u8] {
        &self.options
    }

    /// Checks the option carrying `value`, unchecking any sibling. Returns `false` if the
    /// group has no such option, in which case the selection is left untouched.
    pub fn check(&mut self, value: u8) -> bool {
        match self.options.iter().position(|&opt| opt == value) {
            Some(index) => {
                self.checked = Some(index);
                true
            }
            None => false,
        }
    }

    /// Value of the checked option, if any.
    pub fn selected(&self) -> Option<u8> {
        self.checked.and_then(|index| self.options.get(index).copied())
    }

    /// Value to submit for this group. Unanswered questions are sent as zero.
    pub fn value(&self) -> u8 {
        self.selected().unwrap_or(0)
    }

    /// Unchecks whatever is checked. Does nothing for an unanswered group.
    pub fn clear(&mut self) {
        self.checked = None;
    }

    fn is_valid(&self) -> bool {
        !self.required || self.checked.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct TextField {
    pub id: &'static str,
    pub required: bool,
    pub value: String,
}

impl TextField {
    pub fn new(id: &'static str, required: bool) -> Self {
        Self { id, required, value: String::new() }
    }

    fn is_valid(&self) -> bool {
        !self.required || !self.value.is_empty()
    }
}

/// Everything the submit handler reads from and writes to on the page.
#[derive(Clone, Debug)]
pub struct FeedbackForm {
    /// Classes on the `<form>` element itself.
    pub classes: ClassList,
    pub quest: RatingGroup,
    pub artwork: RatingGroup,
    pub overall: RatingGroup,
    pub quality: RatingGroup,
    pub reason_to_buy: TextField,
    pub optional: TextField,
    pub form_panel: Panel,
    pub thank_you_panel: Panel,
}

impl Default for FeedbackForm {
    /// Five-point scales on every question, with only the reason to buy being required.
    fn default() -> Self {
        Self::with_scale(1..=5)
    }
}

impl FeedbackForm {
    pub fn with_scale(scale: impl IntoIterator<Item = u8> + Clone) -> Self {
        Self {
            classes: ClassList::default(),
            quest: RatingGroup::new(QUEST, scale.clone()),
            artwork: RatingGroup::new(ARTWORK, scale.clone()),
            overall: RatingGroup::new(OVERALL, scale.clone()),
            quality: RatingGroup::new(QUALITY, scale),
            reason_to_buy: TextField::new(REASON_TO_BUY, true),
            optional: TextField::new(OPTIONAL, false),
            form_panel: Panel::new(FORM_PANEL, ClassList::default()),
            thank_you_panel: Panel::new(THANK_YOU_PANEL, ClassList::from([D_NONE])),
        }
    }

    fn groups(&self) -> [&RatingGroup; 4] {
        [&self.quest, &self.artwork, &self.overall, &self.quality]
    }

    fn groups_mut(&mut self) -> [&mut RatingGroup; 4] {
        [&mut self.quest, &mut self.artwork, &mut self.overall, &mut self.quality]
    }

    /// Native constraint validation. On failure, returns the name of the first field
    /// that does not satisfy its constraints.
    pub fn check_validity(&self) -> Result<(), &'static str> {
        if let Some(group) = self.groups().into_iter().find(|group| !group.is_valid()) {
            return Err(group.name);
        }

        match [&self.reason_to_buy, &self.optional].into_iter().find(|field| !field.is_valid()) {
            Some(field) => Err(field.id),
            None => Ok(()),
        }
    }

    pub fn payload(&self) -> Feedback {
        Feedback {
            quest: self.quest.value(),
            artwork: self.artwork.value(),
            overall: self.overall.value(),
            quality: self.quality.value(),
            reason_to_buy: self.reason_to_buy.value.clone(),
            optional: self.optional.value.clone(),
            buy_next: None,
        }
    }

    /// Swaps the form out for the confirmation panel.
    pub fn show_thank_you(&mut self) {
        self.classes.remove(WAS_VALIDATED);
        let thanks = &mut self.thank_you_panel.classes;
        thanks.remove(D_NONE);
        thanks.add(D_FLEX);
        thanks.add(SHOW);
        self.form_panel.classes.add(HIDE);
    }

    /// Clears every answer and brings the form back.
    pub fn reset(&mut self) {
        self.reason_to_buy.value.clear();
        self.optional.value.clear();
        for group in self.groups_mut() {
            group.clear();
        }

        let thanks = &mut self.thank_you_panel.classes;
        thanks.add(D_NONE);
        thanks.remove(D_FLEX);
        thanks.remove(SHOW);

        let form = &mut self.form_panel.classes;
        form.remove(HIDE);
        form.remove(D_NONE);
    }
}
