//! Print the build identity of a binary.
//!
//! Usage: `buildid [path]` - defaults to this executable itself. Exits
//! non-zero when no identity could be resolved.

use std::path::PathBuf;

use callsight::buildid::resolve_build_identity;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    callsight::logging::init_logging()?;

    let path = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => std::env::current_exe()?,
    };

    let identity = resolve_build_identity(&path);
    if identity.is_empty() {
        eprintln!("no identity could be resolved for {}", path.display());
        std::process::exit(1);
    }

    println!("{identity}");
    Ok(())
}
