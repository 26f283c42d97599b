//! Info command implementation.

use clipbeam_core::PairingPayload;

/// Decode a pairing URL and print its contents.
pub fn show_info(url: &str) -> anyhow::Result<()> {
    let payload = PairingPayload::parse(url)?;

    println!("\n\x1b[1mClipbeam Pairing Info\x1b[0m");
    println!("═══════════════════════════════════════");
    println!("\x1b[1mHost:\x1b[0m      {}", payload.host);
    println!("\x1b[1mDevice ID:\x1b[0m {}", payload.device_id);
    println!("\x1b[1mCode:\x1b[0m      {}", payload.code);
    println!("\x1b[1mEndpoint:\x1b[0m  {}", payload.endpoint());
    println!();

    Ok(())
}
