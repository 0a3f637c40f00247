//! Walks through the three classic chains: a fulfilled chain, an error caught
//! mid-chain, and a promise settled before anything is attached.
//!
//! Run with `RUST_LOG=promise_out=debug,scenarios=info` for engine logs.
use promise_out::{Error, Promise};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn fetch_name() -> Result<String, Error> {
    Ok("John".to_string())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let p1 = Promise::<i32>::new();
    let done1 = p1
        .then(|v| {
            info!(v, "first promise resolved");
            Ok(10)
        })
        .then(|v| {
            info!(v, "second promise resolved");
            Ok(20)
        })
        .finally(|| info!("promise 1 execution finished"));
    p1.resolve(5);

    let p2 = Promise::<i32>::new();
    let done2 = p2
        .then(|v| {
            info!(v, "first promise resolved");
            Err::<i32, _>(Error::msg("something went wrong"))
        })
        .catch(|err| {
            info!(%err, "caught");
            Ok(-1)
        })
        .finally(|| info!("promise 2 execution finished"));
    p2.resolve(10);

    let p3 = Promise::<String>::new();
    match fetch_name() {
        Ok(name) => p3.resolve(name),
        Err(err) => p3.reject(err),
    };
    let done3 = p3
        .then(|name| {
            info!(%name, "my name is");
            Ok(name)
        })
        .catch(|err| {
            info!(%err, "caught");
            Ok(String::new())
        })
        .finally(|| info!("promise 3 execution finished"));

    // An untyped payload of the wrong type turns into a rejection.
    let p4 = Promise::<String>::new();
    let done4 = p4
        .catch(|err| {
            info!(%err, "caught");
            Ok(String::new())
        })
        .finally(|| info!("promise 4 execution finished"));
    p4.resolve_any(5_i32);

    let (v1, v2, v3, v4) = (done1.wait()?, done2.wait()?, done3.wait()?, done4.wait()?);
    info!(v1, v2, %v3, ?v4, "all promises settled");
    Ok(())
}
