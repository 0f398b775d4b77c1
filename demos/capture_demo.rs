//! Show what the register capture sees from different call sites.
//!
//! This demo:
//! 1. Captures the caller context from two distinct call sites
//! 2. Captures repeatedly from one site to show the pc is stable
//! 3. Resolves the build identity of this very binary
//!
//! Run with: cargo run --example capture_demo

use callsight::buildid;
use callsight::{capture, CallerContext};

/// Stand-in for an RPC stub; the capture inlines in here, so the reported
/// pc is the return address into whoever called this function.
#[inline(never)]
fn issue_call() -> CallerContext {
    capture()
}

#[inline(never)]
fn checkout_flow() -> CallerContext {
    issue_call()
}

#[inline(never)]
fn billing_flow() -> CallerContext {
    issue_call()
}

fn print_context(label: &str, ctx: &CallerContext) {
    println!("   {label}:");
    println!("      pc = {:#018x}", ctx.pc);
    println!("      sp = {:#018x}", ctx.sp);
    println!("      fp = {:#018x}", ctx.fp);
    #[cfg(target_arch = "aarch64")]
    println!("      lr = {:#018x}", ctx.lr);
}

fn main() {
    println!("┌─────────────────────────────────────────┐");
    println!("│  Caller-Context Capture Walkthrough     │");
    println!("└─────────────────────────────────────────┘\n");

    println!("1. Capturing from two distinct call sites...");
    let checkout = checkout_flow();
    let billing = billing_flow();
    print_context("checkout_flow", &checkout);
    print_context("billing_flow", &billing);
    assert_ne!(checkout.pc, billing.pc);
    println!("   ✅ Distinct call sites report distinct pcs\n");

    println!("2. Capturing five times from the same site...");
    let pcs: Vec<u64> = (0..5).map(|_| checkout_flow().pc).collect();
    println!("   pcs = {:#x?}", pcs);
    assert!(pcs.windows(2).all(|w| w[0] == w[1]));
    println!("   ✅ The pc is stable per call site\n");

    println!("3. Resolving the identity of this binary...");
    let identity = buildid::build_identity_of_self();
    if identity.is_empty() {
        println!("   ⚠️  No identity could be resolved");
    } else {
        println!("   identity = {identity}");
        println!("   ✅ A server can pin this capture to this exact build");
    }
}
