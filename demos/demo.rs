//! Raising, propagating and classifying RPC errors
//!
//! Run with `RUST_LOG=trace` to see construction events, and with
//! `RUST_LIB_BACKTRACE=1` to get full backtraces in `stack()`.

use std::collections::HashMap;

use rpc_core::{trace, ErrorCode, RpcError};
use tracing_subscriber::EnvFilter;

type Handler = fn(&[u8]) -> Result<Vec<u8>, RpcError>;

fn echo_handler(input: &[u8]) -> Result<Vec<u8>, RpcError> {
    Ok(input.to_vec())
}

fn checked_handler(input: &[u8]) -> Result<Vec<u8>, RpcError> {
    if input.is_empty() {
        return Err(RpcError::new("input must not be empty", RpcError::ASSERT));
    }
    Ok(input.to_vec())
}

fn call(
    handlers: &HashMap<&str, Handler>,
    method: &str,
    input: &[u8],
) -> Result<Vec<u8>, RpcError> {
    let handler = handlers.get(method).ok_or_else(|| {
        RpcError::with_data(
            format!("Method \"{method}\" not found"),
            RpcError::METHOD_NOT_FOUND,
            method,
        )
    })?;
    handler(input)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== RpcError Demo ===\n");
    println!("Trace capture: {:?}", trace::capture_policy());
    for (name, code) in RpcError::CODES {
        println!("  {name:<17} {code}");
    }
    println!();

    let mut handlers: HashMap<&str, Handler> = HashMap::new();
    handlers.insert("echo", echo_handler);
    handlers.insert("checked", checked_handler);

    for (method, input) in [
        ("echo", &b"hi"[..]),
        ("checked", &b""[..]),
        ("missing", &b"x"[..]),
    ] {
        println!("Calling '{method}'...");
        match call(&handlers, method, input) {
            Ok(output) => println!("  Result: {:?}", String::from_utf8_lossy(&output)),
            Err(e) => {
                let label = e.kind().map(|k| k.name()).unwrap_or("ad-hoc");
                println!("  Error [{label}]: {e}");
                println!("  Wire form: {}", serde_json::to_string(&e)?);
                if e.is(ErrorCode::Assert) {
                    println!("{}", e.stack());
                }
            }
        }
    }

    println!();

    // Caught generically, then recovered by downcast.
    let err: anyhow::Error = RpcError::default().into();
    if let Some(rpc) = err.downcast_ref::<RpcError>() {
        println!("Generic catch: {err} (code {})", rpc.code());
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
