//! Property tests for degradation, parsing, and rendering invariants.

use proptest::prelude::*;

use termstyle::{Color, Profile, Style};

fn any_profile() -> impl Strategy<Value = Profile> {
    prop_oneof![
        Just(Profile::Ascii),
        Just(Profile::Ansi16),
        Just(Profile::Ansi256),
        Just(Profile::TrueColor),
    ]
}

fn any_color() -> impl Strategy<Value = Color> {
    prop_oneof![
        Just(Color::NoColor),
        (0u8..16).prop_map(Color::Ansi),
        any::<u8>().prop_map(Color::Ansi256),
        any::<(u8, u8, u8)>().prop_map(|(r, g, b)| Color::Rgb(r, g, b)),
    ]
}

fn fidelity(color: Color) -> u8 {
    match color {
        Color::NoColor => 0,
        Color::Ansi(_) => 1,
        Color::Ansi256(_) => 2,
        Color::Rgb(..) => 3,
    }
}

proptest! {
    #[test]
    fn convert_is_idempotent(profile in any_profile(), color in any_color()) {
        let once = profile.convert(color);
        prop_assert_eq!(profile.convert(once), once);
    }

    #[test]
    fn convert_never_upgrades_fidelity(profile in any_profile(), color in any_color()) {
        let converted = profile.convert(color);
        prop_assert!(fidelity(converted) <= fidelity(color));
    }

    #[test]
    fn stepwise_degradation_equals_direct(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let color = Color::Rgb(r, g, b);
        let direct = Profile::Ansi16.convert(color);
        let chained = Profile::Ansi16.convert(Profile::Ansi256.convert(color));
        prop_assert_eq!(direct, chained);
    }

    #[test]
    fn rgb_to_ansi256_lands_in_extended_range(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        match Profile::Ansi256.convert(Color::Rgb(r, g, b)) {
            Color::Ansi256(index) => prop_assert!(index >= 16),
            other => prop_assert!(false, "unexpected conversion result {other:?}"),
        }
    }

    #[test]
    fn parse_never_panics(spec in "\\PC*") {
        let _ = Color::parse(&spec);
    }

    #[test]
    fn parse_valid_decimal_round_trips(index in 0u32..256) {
        let parsed = Color::parse(&index.to_string());
        match parsed {
            Color::Ansi(i) => prop_assert!(u32::from(i) == index && index < 16),
            Color::Ansi256(i) => prop_assert!(u32::from(i) == index && index >= 16),
            other => prop_assert!(false, "unexpected parse result {other:?}"),
        }
    }

    #[test]
    fn sequence_never_panics(color in any_color(), background in any::<bool>()) {
        let _ = color.sequence(background);
    }

    #[test]
    fn render_always_contains_the_text(
        profile in any_profile(),
        color in any_color(),
        text in "[a-zA-Z0-9 ]{0,20}",
    ) {
        let rendered = Style::new(profile, text.as_str())
            .bold()
            .foreground(color)
            .render();
        prop_assert!(rendered.contains(&text));
    }

    #[test]
    fn ascii_render_is_escape_free(color in any_color(), text in "[a-zA-Z0-9 ]{0,20}") {
        let rendered = Style::new(Profile::Ascii, text.as_str())
            .bold()
            .underline()
            .foreground(color)
            .render();
        prop_assert_eq!(rendered, text);
    }

    #[test]
    fn attribute_order_never_matters(text in "[a-z]{1,8}") {
        let forward = Style::new(Profile::Ansi16, text.as_str()).bold().italic().crossout();
        let backward = Style::new(Profile::Ansi16, text.as_str()).crossout().italic().bold();
        prop_assert_eq!(forward.render(), backward.render());
    }
}
