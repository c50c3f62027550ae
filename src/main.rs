use api::{mail, Service};
use core::time::Duration;
use hyper::{server::conn::http1, service};
use hyper_util::rt::TokioIo;
use std::{
    convert::Infallible,
    env,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::{net::TcpListener, runtime::Runtime, time};

/// Reads an environment variable, treating an empty value as unset.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.is_empty())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse environment variables
    let port = match var("PORT") {
        Some(port) => port.parse()?,
        None => {
            log::info!("defaulting to port 8080");
            8080
        }
    };
    let name = var("NAME").unwrap_or_else(|| String::from("World!"));
    let from = var("MYSTIC_CASE_FROM").unwrap_or_default();
    let to = var("MYSTIC_CASE_TO").unwrap_or_default();
    let smtp = match var("MYSTIC_CASE_SMTP_HOST") {
        Some(host) => Some(mail::SmtpConfig {
            host,
            port: var("MYSTIC_CASE_SMTP_PORT").map(|port| port.parse()).transpose()?,
            username: var("MYSTIC_CASE_USERNAME").unwrap_or_default(),
            password: var("MYSTIC_CASE_PASSWORD").unwrap_or_default(),
            from: from.clone(),
            to: to.clone(),
        }),
        None => None,
    };

    // Start the mail worker
    let runtime = Runtime::new()?;
    let (outbox, postman) = mail::channel(mail::CAPACITY);
    let worker = match smtp {
        Some(config) => {
            log::info!("delivering feedback through {}", config.host);
            let delivery = mail::SmtpDelivery::new(config)?;
            runtime.spawn(postman.run(delivery))
        }
        None => {
            log::warn!("MYSTIC_CASE_SMTP_HOST is not set, feedback will only be logged");
            let delivery = mail::LogDelivery::new(from.into_boxed_str(), to.into_boxed_str());
            runtime.spawn(postman.run(delivery))
        }
    };

    let app = Arc::new(Service::new(&name, outbox));
    drop(name);

    let addr: SocketAddr = (Ipv4Addr::UNSPECIFIED, port).into();
    runtime.block_on(async move {
        let tcp = TcpListener::bind(addr).await?;
        log::info!("listening on {addr}");

        let mut stop = core::pin::pin!(tokio::signal::ctrl_c());
        loop {
            let (stream, peer) = tokio::select! {
                biased;
                res = &mut stop => {
                    res?;
                    break;
                }
                res = tcp.accept() => res?,
            };

            let outer = Arc::clone(&app);
            tokio::spawn(async move {
                let svc = service::service_fn(move |req| {
                    let inner = Arc::clone(&outer);
                    async move { Ok::<_, Infallible>(inner.respond(req).await) }
                });
                if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), svc).await {
                    log::error!("connection with {peer} failed: {err}");
                }
            });
        }

        // Give queued notifications a chance to go out once open connections let go.
        log::info!("shutting down");
        drop(app);
        if time::timeout(Duration::from_secs(5), worker).await.is_err() {
            log::warn!("mail queue was not drained in time");
        }

        anyhow::Ok(())
    })
}
