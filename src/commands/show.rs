//! Dry run: describe a session without touching hardware

use chainprog_core::{expected_readback, BitPattern, ChannelMap, PinAssignment};

/// Print the pattern, the register bytes it uses and the channel map
pub fn show_pattern(pins: &PinAssignment, pattern: &BitPattern) {
    println!("Pins: {}", pins);
    println!("Output mask: 0x{:02X}", pins.output_mask());
    println!();

    println!("Pattern (shift order):");
    println!("  bits: {}", pattern);
    println!("  hex:  0x{}", pattern.to_hex());
    println!(
        "Expected readback: 0x{}",
        expected_readback(pattern).to_hex()
    );
    println!();

    println!("Register bytes:");
    println!("  {:<4} {:<4} {:<5} {:>6}", "CS", "CK", "DOUT", "Byte");
    println!("  {}", "-".repeat(22));
    for cs in [false, true] {
        for ck in [false, true] {
            for dout in [false, true] {
                println!(
                    "  {:<4} {:<4} {:<5}   0x{:02X}",
                    u8::from(cs),
                    u8::from(ck),
                    u8::from(dout),
                    pins.register(cs, ck, dout)
                );
            }
        }
    }
    println!();

    println!("Channels (1-25, # = on):");
    for line in ChannelMap::from_pattern(*pattern).to_string().lines() {
        println!("  {}", line);
    }
}
