//! Normalization pipeline behaviour on messy generator output.

use quill::normalizer::{TerminalMark, TextNormalizer};
use quill::persona::{CanonicalRule, PersonaConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn persona_normalizer() -> TextNormalizer {
    let persona = PersonaConfig::builtin().expect("valid persona");
    TextNormalizer::new(&persona.canonical, TerminalMark::Exclaim).expect("rules compile")
}

fn rule(pattern: &str, replacement: &str) -> CanonicalRule {
    CanonicalRule {
        pattern: pattern.to_owned(),
        replacement: replacement.to_owned(),
    }
}

/// Raw outputs of the kind local models actually produce.
const MESSY_OUTPUTS: &[&str] = &[
    "Tweet: \"Chart check: big rally!!\"   #hi",
    "Sure! Here is your post:\nPost: Validators are humming along today... more soon",
    "\u{201C}Blocks keep landing,\u{201D} said everyone. Note: 60 characters",
    "1. **Big news** - Firedancer testnet is live!!! \u{1F680}\u{1F680} #Solana @solana",
    "[Meta] Staking yields look steady [edit: checked twice] for now;",
    "> * Fees stay tiny (Source: explorer) and apps keep shipping ,",
    "Real talk:the market is choppy,but builders keep building.Zoom out",
    "SOLANA (SOL) and $sol and sol... all the same thing?!",
    "Explanation: this post is about NFTs",
    "\u{2014}\u{2014} hello there \u{2014}\u{2014}",
    "  ...   ?!  ",
    "Price hit 1.5x while volume.Exploded overnight",
    "Your response should be short. Ok",
    "tweet : gm frens, wagmi \u{1FAE1}",
    "\"\" empty quotes then text",
    "Trailing colon:",
    "3 ) list item without dot spacing",
    "Ticker $ SOL is trending; solana fans cheer",
    "Solana (SOL) keeps shipping",
    "***",
    "A \u{2026} B \u{2026} C",
    "wow!!!!!!!! so fast??? really...",
    "Tweet: \"first\" Tweet: \"second\"",
    "\"New post: validators are humming today\"",
    "\"Read this tweet: blocks keep landing\"",
    "\u{2026}validators are humming today",
    "#sol is up today",
    "@sol and #SOL fans cheer loudly",
    "_sol keeps shipping",
    "\u{201C}Note: \u{201D} Your response was short",
    "Email mailto:team@quill.dev or pin ipfs:QmXyZ today",
    "Docs at https://x.com/fees?tab=Overview for details",
];

/// Pieces that interact across stages: labels, quotes, ellipses, brackets,
/// tags next to tickers, cutoffs, URIs and leading punctuation.
const FRAGMENTS: &[&str] = &[
    "Tweet:", "post:", "Post :", "Read this tweet:", "\"", "\u{201C}", "\u{201D}", "\u{2026}",
    "...", "[meta]", "[", "]", "(Note: x)", "(98 characters)", "#sol", "@sol", "#Solana",
    "sol", "SOL", "Solana (SOL)", "$ sol", "_sol", "validators", "are", "humming", "today",
    "blocks", "keep", "landing", "Note:", "Your response", "!!", "?!", ",", ";", ":", "-",
    "\u{2014}", "*", "**", "1.", "2)", ">", "\u{2022}", "\u{1F680}", "\n", "  ", "_", "~",
    "(", ")", "talk:the", "volume.Exploded", "1.5x", "https://x.com/a?b=C", "mailto:hi@x.io",
    "ipfs:QmAbc",
];

fn generated_outputs(seed: u64, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let pieces = rng.gen_range(1..=12);
            let mut raw = String::new();
            for _ in 0..pieces {
                raw.push_str(FRAGMENTS.choose(&mut rng).expect("fragments"));
                if rng.gen_bool(0.6) {
                    raw.push(' ');
                }
            }
            raw
        })
        .collect()
}

#[test]
fn scaffolded_quoted_output_is_cleaned() {
    let n = persona_normalizer();
    assert_eq!(
        n.normalize("Tweet: \"Chart check: big rally!!\"   #hi"),
        "Chart check: big rally!"
    );
}

#[test]
fn normalize_is_idempotent_over_corpus() {
    let n = persona_normalizer();
    for raw in MESSY_OUTPUTS {
        let once = n.normalize(raw);
        let twice = n.normalize(&once);
        assert_eq!(once, twice, "not idempotent for {raw:?}");
    }
}

#[test]
fn normalize_is_idempotent_over_generated_outputs() {
    let n = persona_normalizer();
    for raw in generated_outputs(0x5eed, 5000) {
        let once = n.normalize(&raw);
        let twice = n.normalize(&once);
        assert_eq!(once, twice, "not idempotent for {raw:?}");
    }
}

#[test]
fn labels_inside_quotes_are_dropped() {
    let n = persona_normalizer();
    assert_eq!(
        n.normalize("\"New post: validators are humming today\""),
        "validators are humming today!"
    );
    assert_eq!(
        n.normalize("\"Read this tweet: blocks keep landing\""),
        "blocks keep landing!"
    );
}

#[test]
fn leading_ellipsis_is_trimmed() {
    let n = persona_normalizer();
    assert_eq!(
        n.normalize("\u{2026}validators are humming today"),
        "validators are humming today!"
    );
}

#[test]
fn ticker_tags_and_mentions_are_stripped() {
    let n = persona_normalizer();
    assert_eq!(n.normalize("#sol is up today"), "is up today!");
    assert_eq!(
        n.normalize("@sol and #SOL fans cheer loudly"),
        "and fans cheer loudly!"
    );
}

#[test]
fn scheme_uris_are_left_intact() {
    let n = persona_normalizer();
    assert_eq!(
        n.normalize("Email mailto:team@quill.dev or pin ipfs:QmXyZ today"),
        "Email mailto:team@quill.dev or pin ipfs:QmXyZ today!"
    );
    assert_eq!(
        n.normalize("Docs at https://x.com/fees?tab=Overview for details"),
        "Docs at https://x.com/fees?tab=Overview for details!"
    );
}

#[test]
fn corpus_expectations() {
    let n = persona_normalizer();
    let cases = [
        (
            MESSY_OUTPUTS[1],
            "Validators are humming along today. more soon!",
        ),
        (MESSY_OUTPUTS[2], "Blocks keep landing!"),
        (MESSY_OUTPUTS[3], "Big news - Firedancer testnet is live!"),
        (MESSY_OUTPUTS[4], "Staking yields look steady for now!"),
        (MESSY_OUTPUTS[5], "Fees stay tiny and apps keep shipping!"),
        (
            MESSY_OUTPUTS[6],
            "Real talk: the market is choppy, but builders keep building. Zoom out!",
        ),
        (MESSY_OUTPUTS[9], "hello there!"),
        (
            MESSY_OUTPUTS[11],
            "Price hit 1.5x while volume. Exploded overnight!",
        ),
        (MESSY_OUTPUTS[13], "gm frens, wagmi!"),
        (MESSY_OUTPUTS[16], "list item without dot spacing!"),
        (MESSY_OUTPUTS[21], "wow! so fast? really."),
        (MESSY_OUTPUTS[22], "first!"),
    ];
    for (raw, expected) in cases {
        assert_eq!(n.normalize(raw), expected, "input {raw:?}");
    }
}

#[test]
fn meta_only_output_normalizes_to_empty() {
    let n = persona_normalizer();
    for raw in [
        "",
        "Tweet:",
        "#only @tags",
        "***",
        "  ...   ?!  ",
        "Explanation: this post is about NFTs",
        "Your response should be short. Ok",
    ] {
        assert_eq!(n.normalize(raw), "", "input {raw:?}");
    }
}

#[test]
fn brand_terms_fold_to_canonical_forms() {
    let n = persona_normalizer();
    assert_eq!(n.normalize("solana (sol) is up"), "$SOL is up!");
    assert_eq!(
        n.normalize("$ sol and SOL and Solana and SOLANA"),
        "$SOL and $SOL and Solana and Solana!"
    );
    assert_eq!(
        n.normalize("Ticker $ SOL is trending; solana fans cheer"),
        "Ticker $SOL is trending; Solana fans cheer!"
    );
    // Words merely containing the ticker stay untouched.
    assert_eq!(n.normalize("Solstice vibes"), "Solstice vibes!");
}

#[test]
fn compound_rule_must_precede_bare_rule() {
    let compound = rule(r"(?i)\bsolana\s*\(\s*sol\s*\)", "$$SOL");
    let bare = rule(r"(?i)(^|[^$#@\w])sol\b", "${1}$$SOL");

    let ordered = TextNormalizer::new(&[compound.clone(), bare.clone()], TerminalMark::Exclaim)
        .expect("rules compile");
    assert_eq!(
        ordered.normalize("Solana (SOL) keeps shipping"),
        "$SOL keeps shipping!"
    );

    let reversed =
        TextNormalizer::new(&[bare, compound], TerminalMark::Exclaim).expect("rules compile");
    assert_eq!(
        reversed.normalize("Solana (SOL) keeps shipping"),
        "Solana ($SOL) keeps shipping!"
    );
}

#[test]
fn invalid_rule_is_rejected() {
    assert!(TextNormalizer::new(&[rule("(oops", "x")], TerminalMark::Exclaim).is_err());
}

#[test]
fn artifacts_are_removed() {
    let n = persona_normalizer();
    assert_eq!(
        n.normalize("Big news @solana #Solana for builders"),
        "Big news for builders!"
    );
    assert_eq!(
        n.normalize("[Draft] Validators [note [internal]] are fast"),
        "Validators are fast!"
    );
    assert_eq!(
        n.normalize("Fees stay tiny today (98 characters)"),
        "Fees stay tiny today!"
    );
    assert_eq!(
        n.normalize("\u{1F680}\u{1F680} **Huge** upgrade shipped \u{1F525}"),
        "Huge upgrade shipped!"
    );
    assert_eq!(
        n.normalize("- 1) Validators vote every slot"),
        "Validators vote every slot!"
    );
}

#[test]
fn punctuation_is_repaired() {
    let n = persona_normalizer();
    assert_eq!(
        n.normalize("Wow , what a week !!! Fees dropped,,great"),
        "Wow, what a week! Fees dropped, great!"
    );
}

#[test]
fn decimals_and_urls_keep_their_dots() {
    let n = persona_normalizer();
    assert_eq!(
        n.normalize("Fees fell to 0.00025 per tx, see https://docs.example.com/fees"),
        "Fees fell to 0.00025 per tx, see https://docs.example.com/fees!"
    );
}

#[test]
fn terminal_mark_is_configurable() {
    let n = TextNormalizer::new(&[], TerminalMark::Period).expect("no rules");
    assert_eq!(n.terminal_mark(), TerminalMark::Period);
    assert_eq!(n.normalize("Blocks keep landing -"), "Blocks keep landing.");
    assert_eq!(n.normalize("Blocks keep landing?"), "Blocks keep landing?");
}

#[test]
fn truncate_respects_budget_and_terminates() {
    let n = persona_normalizer();
    let long = n.normalize(&"Validators keep voting and blocks keep landing ".repeat(9));
    assert!(long.chars().count() > 240);

    let cut = n.truncate(&long, 240);
    assert!(cut.chars().count() <= 240);
    assert!(cut.ends_with("landing!"), "cut at a word boundary: {cut}");
    assert_eq!(n.normalize(&cut), cut);
}

#[test]
fn truncate_leaves_short_text_alone() {
    let n = persona_normalizer();
    assert_eq!(n.truncate("Short enough!", 40), "Short enough!");
}
