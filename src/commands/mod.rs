//! CLI command implementations
//!
//! Every command resolves its inputs the same way: built-in defaults,
//! overridden by the settings file, overridden by command-line flags.

mod list;
mod run;
mod show;

pub use list::{list_devices, list_programmers};
pub use run::run_session;
pub use show::show_pattern;

use chainprog_core::{Bank, BitPattern, ChannelMap, PinAssignment, PinError, Settings};

use crate::cli::{PatternArgs, PinArgs};

/// Pin assignment from settings with flag overrides
pub fn resolve_pins(settings: &Settings, args: &PinArgs) -> Result<PinAssignment, PinError> {
    let p = &settings.pins;
    PinAssignment::new(
        args.cs.unwrap_or(p.cs),
        args.ck.unwrap_or(p.ck),
        args.dout.unwrap_or(p.dout),
        args.din.unwrap_or(p.din),
    )
}

/// Pattern from settings with flag overrides
///
/// `--pattern` replaces the configured pattern; channel flags are then
/// applied in order: all-on, on lists, off lists.
pub fn resolve_pattern(
    settings: &Settings,
    args: &PatternArgs,
) -> Result<BitPattern, Box<dyn std::error::Error>> {
    let base = match &args.pattern {
        Some(text) => text.parse::<BitPattern>()?,
        None => settings.pattern()?,
    };

    let mut map = ChannelMap::from_pattern(base);
    if args.all_lv {
        map.set_all(Bank::Low, true);
    }
    if args.all_hv {
        map.set_all(Bank::High, true);
    }
    for &channel in &args.lv_on {
        map.set(Bank::Low, channel, true)?;
    }
    for &channel in &args.hv_on {
        map.set(Bank::High, channel, true)?;
    }
    for &channel in &args.lv_off {
        map.set(Bank::Low, channel, false)?;
    }
    for &channel in &args.hv_off {
        map.set(Bank::High, channel, false)?;
    }
    Ok(map.into_pattern())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings::from_toml_str("[pins]\ncs = 5\nck = 6\n").unwrap();
        let args = PinArgs {
            ck: Some(7),
            ..Default::default()
        };
        let pins = resolve_pins(&settings, &args).unwrap();
        assert_eq!(pins, PinAssignment::new(5, 7, 1, 0).unwrap());
    }

    #[test]
    fn test_flag_collision_rejected() {
        let args = PinArgs {
            din: Some(2),
            ..Default::default()
        };
        assert!(resolve_pins(&Settings::default(), &args).is_err());
    }

    #[test]
    fn test_pattern_flags() {
        let settings = Settings::from_toml_str("[pattern]\nlv_on = [4]\n").unwrap();
        let args = PatternArgs {
            all_hv: true,
            hv_off: vec![3],
            lv_on: vec![5],
            ..Default::default()
        };
        let map = ChannelMap::from_pattern(resolve_pattern(&settings, &args).unwrap());
        assert_eq!(map.on_channels(Bank::Low), vec![4, 5]);
        assert_eq!(map.on_channels(Bank::High).len(), 24);
        assert!(!map.is_on(Bank::High, 3).unwrap());
    }

    #[test]
    fn test_pattern_flag_replaces_settings() {
        let settings = Settings::from_toml_str("[pattern]\nlv_on = [4]\n").unwrap();
        let args = PatternArgs {
            pattern: Some(format!("0x{}", "0".repeat(24))),
            ..Default::default()
        };
        assert_eq!(
            resolve_pattern(&settings, &args).unwrap(),
            BitPattern::zeroed()
        );

        let args = PatternArgs {
            hv_on: vec![26],
            ..Default::default()
        };
        assert!(resolve_pattern(&settings, &args).is_err());
    }
}
