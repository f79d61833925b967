//! Language utilities for ISO language code handling
//!
//! Containers tag subtitle tracks with ISO 639-2/B (bibliographic) codes while
//! the translation service speaks ISO 639-1. This module maps between the two
//! and resolves display names.

use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// ISO 639-1 to ISO 639-2/B, the form Matroska writes into track headers.
static ISO_639_1_TO_2B: &[(&str, &str)] = &[
    ("aa", "aar"), ("ab", "abk"), ("ae", "ave"), ("af", "afr"), ("ak", "aka"), ("am", "amh"),
    ("an", "arg"), ("ar", "ara"), ("as", "asm"), ("av", "ava"), ("ay", "aym"), ("az", "aze"),
    ("ba", "bak"), ("be", "bel"), ("bg", "bul"), ("bh", "bih"), ("bi", "bis"), ("bm", "bam"),
    ("bn", "ben"), ("bo", "tib"), ("br", "bre"), ("bs", "bos"), ("ca", "cat"), ("ce", "che"),
    ("ch", "cha"), ("co", "cos"), ("cr", "cre"), ("cs", "cze"), ("cu", "chu"), ("cv", "chv"),
    ("cy", "wel"), ("da", "dan"), ("de", "ger"), ("dv", "div"), ("dz", "dzo"), ("ee", "ewe"),
    ("el", "gre"), ("en", "eng"), ("eo", "epo"), ("es", "spa"), ("et", "est"), ("eu", "baq"),
    ("fa", "per"), ("ff", "ful"), ("fi", "fin"), ("fj", "fij"), ("fo", "fao"), ("fr", "fre"),
    ("fy", "fry"), ("ga", "gle"), ("gd", "gla"), ("gl", "glg"), ("gn", "grn"), ("gu", "guj"),
    ("gv", "glv"), ("ha", "hau"), ("he", "heb"), ("hi", "hin"), ("ho", "hmo"), ("hr", "hrv"),
    ("ht", "hat"), ("hu", "hun"), ("hy", "arm"), ("hz", "her"), ("ia", "ina"), ("id", "ind"),
    ("ie", "ile"), ("ig", "ibo"), ("ii", "iii"), ("ik", "ipk"), ("io", "ido"), ("is", "ice"),
    ("it", "ita"), ("iu", "iku"), ("ja", "jpn"), ("jv", "jav"), ("ka", "geo"), ("kg", "kon"),
    ("ki", "kik"), ("kj", "kua"), ("kk", "kaz"), ("kl", "kal"), ("km", "khm"), ("kn", "kan"),
    ("ko", "kor"), ("kr", "kau"), ("ks", "kas"), ("ku", "kur"), ("kv", "kom"), ("kw", "cor"),
    ("ky", "kir"), ("la", "lat"), ("lb", "ltz"), ("lg", "lug"), ("li", "lim"), ("ln", "lin"),
    ("lo", "lao"), ("lt", "lit"), ("lu", "lub"), ("lv", "lav"), ("mg", "mlg"), ("mh", "mah"),
    ("mi", "mao"), ("mk", "mac"), ("ml", "mal"), ("mn", "mon"), ("mr", "mar"), ("ms", "may"),
    ("mt", "mlt"), ("my", "bur"), ("na", "nau"), ("nb", "nob"), ("nd", "nde"), ("ne", "nep"),
    ("ng", "ndo"), ("nl", "dut"), ("nn", "nno"), ("no", "nor"), ("nr", "nbl"), ("nv", "nav"),
    ("ny", "nya"), ("oc", "oci"), ("oj", "oji"), ("om", "orm"), ("or", "ori"), ("os", "oss"),
    ("pa", "pan"), ("pi", "pli"), ("pl", "pol"), ("ps", "pus"), ("pt", "por"), ("qu", "que"),
    ("rm", "roh"), ("rn", "run"), ("ro", "rum"), ("ru", "rus"), ("rw", "kin"), ("sa", "san"),
    ("sc", "srd"), ("sd", "snd"), ("se", "sme"), ("sg", "sag"), ("si", "sin"), ("sk", "slo"),
    ("sl", "slv"), ("sm", "smo"), ("sn", "sna"), ("so", "som"), ("sq", "alb"), ("sr", "srp"),
    ("ss", "ssw"), ("st", "sot"), ("su", "sun"), ("sv", "swe"), ("sw", "swa"), ("ta", "tam"),
    ("te", "tel"), ("tg", "tgk"), ("th", "tha"), ("ti", "tir"), ("tk", "tuk"), ("tl", "tgl"),
    ("tn", "tsn"), ("to", "ton"), ("tr", "tur"), ("ts", "tso"), ("tt", "tat"), ("tw", "twi"),
    ("ty", "tah"), ("ug", "uig"), ("uk", "ukr"), ("ur", "urd"), ("uz", "uzb"), ("ve", "ven"),
    ("vi", "vie"), ("vo", "vol"), ("wa", "wln"), ("wo", "wol"), ("xh", "xho"), ("yi", "yid"),
    ("yo", "yor"), ("za", "zha"), ("zh", "chi"), ("zu", "zul"),
];

static PART1_INDEX: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| ISO_639_1_TO_2B.iter().copied().collect());

/// Bibliographic codes that differ from their terminology counterpart
static PART2B_TO_2T: &[(&str, &str)] = &[
    ("alb", "sqi"), ("arm", "hye"), ("baq", "eus"), ("bur", "mya"), ("chi", "zho"),
    ("cze", "ces"), ("dut", "nld"), ("fre", "fra"), ("geo", "kat"), ("ger", "deu"),
    ("gre", "ell"), ("ice", "isl"), ("mac", "mkd"), ("mao", "mri"), ("may", "msa"),
    ("per", "fas"), ("rum", "ron"), ("slo", "slk"), ("tib", "bod"), ("wel", "cym"),
];

/// Three-letter code Matroska uses for English
pub const ENGLISH_PART2: &str = "eng";

/// Three-letter code Matroska uses for an undetermined language
pub const UNDETERMINED_PART2: &str = "und";

/// Map a two-letter code to the three-letter code found in container metadata.
///
/// A miss is not an error: callers get `None` and decide what to do with it.
pub fn iso639_1_to_2(code: &str) -> Option<&'static str> {
    let normalized_code = code.trim().to_lowercase();
    PART1_INDEX.get(normalized_code.as_str()).copied()
}

/// Number of two-letter codes the mapper knows about
pub fn known_language_count() -> usize {
    ISO_639_1_TO_2B.len()
}

/// Check whether a three-letter container code denotes English
pub fn is_english(code: &str) -> bool {
    code.eq_ignore_ascii_case(ENGLISH_PART2)
}

/// Resolve a two- or three-letter code to an `isolang` language
fn lookup(code: &str) -> Option<Language> {
    let normalized_code = code.trim().to_lowercase();
    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => {
            let part2t = PART2B_TO_2T
                .iter()
                .find(|(bibliographic, _)| *bibliographic == normalized_code)
                .map_or(normalized_code.as_str(), |(_, terminology)| *terminology);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Get the English language name from a two- or three-letter code
pub fn get_language_name(code: &str) -> Result<String> {
    let lang = lookup(code)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}
