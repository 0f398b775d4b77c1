//! End-to-end walk of the propagation protocol inside one process.
//!
//! This demo:
//! 1. Enables propagation (process metadata with a local address)
//! 2. Sends a request through the client interceptor
//! 3. Hands it to a simulated server that extracts the envelope and runs
//!    a handler inside the caller-context scope
//!
//! Run with: cargo run --example propagation_demo

use std::net::Ipv4Addr;

use tonic::service::Interceptor;
use tonic::{Request, Response, Status};
use tower::util::ServiceExt;

use callsight::{
    current_caller, extract_envelope, with_caller_context, CallerContextInterceptor,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    callsight::logging::init_logging()?;

    println!("┌─────────────────────────────────────────┐");
    println!("│  One-Hop Context Propagation Demo       │");
    println!("└─────────────────────────────────────────┘\n");

    println!("1. Enabling propagation for this process...");
    let ip = callsight::process::first_non_loopback_ipv4()
        .unwrap_or(Ipv4Addr::new(127, 0, 0, 1));
    callsight::process::init_with_ip(ip)?;
    println!("   ✅ Process metadata: ip = {ip}\n");

    println!("2. Attaching the caller context on the way out...");
    let mut interceptor = CallerContextInterceptor::from_process();
    let request = interceptor.call(Request::new(()))?;
    println!(
        "   ✅ Metadata now carries {} bytes under {:?}\n",
        request
            .metadata()
            .get_bin(callsight::CALLER_CONTEXT_KEY)
            .and_then(|v| v.to_bytes().ok())
            .map(|b| b.len())
            .unwrap_or(0),
        callsight::CALLER_CONTEXT_KEY,
    );

    println!("3. Serving the call on the simulated far side...");
    let server = tower::service_fn(|request: Request<()>| async move {
        let envelope = extract_envelope(request.metadata());
        with_caller_context(envelope, async {
            match current_caller() {
                Some(caller) => {
                    println!(
                        "   handler sees caller {}:{} at pc {:#x}",
                        caller.identity.source_ipv4(),
                        caller.identity.process_id,
                        caller.context.pc,
                    );
                }
                None => println!("   handler sees no caller context"),
            }
            Ok::<_, Status>(Response::new(()))
        })
        .await
    });
    server.oneshot(request).await?;
    println!("   ✅ Handler ran with the caller's context in scope");

    Ok(())
}
