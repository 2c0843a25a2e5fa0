//! Property tests for WSL path translation and argument filtering

use gitrun::{
    ArgumentFilter, LongOptionNormalizer, TranslationContext, TranslationError,
    WslArgumentFilter, extract_identifier, standardize_quotes,
};
use proptest::prelude::*;

fn distro() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9.-]{1,15}"
}

fn segments() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z0-9_.-]{1,10}", 0..6)
}

/// Tokens that never name a WSL path and never start with a double quote.
fn plain_token() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9./_-]{0,12}",
        "-[a-zA-Z]",
        "--[a-z][a-z-]{0,10}",
        "--[a-z][a-z-]{0,10}=[a-zA-Z0-9./_-]{0,10}",
        Just("-C".to_string()),
    ]
}

proptest! {
    /// The distro name and Linux working directory come straight from the host path.
    #[test]
    fn prop_context_extracts_distro_and_working_dir(
        distro in distro(),
        segments in segments(),
        upper_marker in any::<bool>(),
    ) {
        let marker = if upper_marker { r"\\WSL$\" } else { r"\\wsl$\" };
        let host = format!("{marker}{distro}\\{}", segments.join("\\"));

        let context = TranslationContext::try_new(&host).unwrap();
        prop_assert_eq!(context.distro(), distro.as_str());
        prop_assert_eq!(context.working_dir(), format!("/{}", segments.join("/")));
        prop_assert_eq!(extract_identifier(&host).unwrap(), distro);
    }

    /// Paths below the working directory translate to the matching Linux path.
    #[test]
    fn prop_translate_path_maps_separators(
        distro in distro(),
        segments in segments(),
        tail in segments(),
    ) {
        let context = TranslationContext::try_new(&format!(r"\\wsl$\{distro}\{}", segments.join("\\"))).unwrap();
        let host = format!(r"\\wsl$\{distro}\{}", tail.join("\\"));
        prop_assert_eq!(context.translate_path(&host), Some(format!("/{}", tail.join("/"))));
    }

    /// Anything without the marker is rejected as not nested.
    #[test]
    fn prop_paths_without_marker_are_rejected(path in "[A-Za-z]:\\\\[A-Za-z0-9\\\\ ]{0,30}") {
        let rejected = matches!(
            TranslationContext::try_new(&path),
            Err(TranslationError::NotNestedPath { .. })
        );
        prop_assert!(rejected);
    }

    /// A one-character distro name is never accepted.
    #[test]
    fn prop_single_character_distro_is_missing_identifier(
        name in "[A-Za-z0-9]",
        segments in segments(),
    ) {
        let host = format!(r"\\wsl$\{name}\{}", segments.join("\\"));
        let rejected = matches!(
            extract_identifier(&host),
            Err(TranslationError::MissingIdentifier { .. })
        );
        prop_assert!(rejected);
    }

    /// Re-quoting an already quoted value changes nothing.
    #[test]
    fn prop_standardize_quotes_is_idempotent(value in "\\PC{0,24}") {
        let once = standardize_quotes(&value);
        prop_assert_eq!(standardize_quotes(&once), once.clone());
        prop_assert!(once.starts_with('\'') && once.ends_with('\''));
    }

    /// Normalising a long option twice equals normalising it once.
    #[test]
    fn prop_long_option_normalization_is_idempotent(
        key in "[a-zA-Z0-9_-]{1,12}",
        value in "\\PC{0,24}",
    ) {
        let normalizer = LongOptionNormalizer::new();
        let once = normalizer.normalize(&format!("--{key}={value}"));
        prop_assert_eq!(normalizer.normalize(&once), once.clone());
        let prefix = format!("--{}=", key);
        prop_assert!(once.starts_with(&prefix));
    }

    /// Without WSL paths the output is the preamble plus each token normalised,
    /// in order, with the value after `-C` passed through verbatim.
    #[test]
    fn prop_plain_arguments_reduce_to_preamble_and_normalized_tokens(
        distro in distro(),
        segments in segments(),
        tokens in proptest::collection::vec(plain_token(), 0..12),
    ) {
        let filter = WslArgumentFilter::for_working_dir(&format!(r"\\wsl$\{distro}\{}", segments.join("\\"))).unwrap();
        let normalizer = LongOptionNormalizer::new();

        let mut expected = vec![
            "-d".to_string(),
            distro.clone(),
            "--".to_string(),
            "git".to_string(),
            "-C".to_string(),
            format!("'/{}'", segments.join("/")),
        ];
        let mut verbatim_next = false;
        for token in &tokens {
            if verbatim_next {
                expected.push(token.clone());
                verbatim_next = false;
            } else {
                expected.push(normalizer.normalize(token));
                verbatim_next = token == "-C";
            }
        }

        let filtered = filter.filter(Some(&tokens.join(" ")));
        prop_assert_eq!(filtered, expected.join(" "));
    }

    /// Every `-C` keeps its original value right behind it and the token count
    /// is preserved.
    #[test]
    fn prop_directory_flag_values_stay_adjacent(
        distro in distro(),
        tokens in proptest::collection::vec(plain_token(), 0..12),
        values in proptest::collection::vec("\"[a-z ]{0,8}\"|'[a-z]{0,8}'|[a-z/]{1,8}", 0..4),
    ) {
        let filter = WslArgumentFilter::for_working_dir(&format!(r"\\wsl$\{distro}\repo")).unwrap();

        let mut input = tokens.clone();
        for value in &values {
            if !value.contains(' ') {
                input.push("-C".to_string());
                input.push(value.clone());
            }
        }
        let filtered = filter.filter(Some(&input.join(" ")));
        let output: Vec<&str> = filtered.split(' ').skip(6).collect();

        prop_assert_eq!(output.len(), input.len());
        for (i, token) in input.iter().enumerate() {
            if i > 0 && input[i - 1] == "-C" && (i < 2 || input[i - 2] != "-C") {
                prop_assert_eq!(output[i], token.as_str());
            }
        }
    }

    /// Absent, empty and all-space argument strings give just the preamble.
    #[test]
    fn prop_blank_arguments_give_preamble_only(distro in distro(), spaces in " {0,5}") {
        let filter = WslArgumentFilter::for_working_dir(&format!(r"\\wsl$\{distro}\home")).unwrap();
        let preamble = format!("-d {distro} -- git -C '/home'");
        prop_assert_eq!(filter.filter(None), preamble.clone());
        prop_assert_eq!(filter.filter(Some(&spaces)), preamble);
    }
}

#[test]
fn test_status_in_ubuntu_repository() {
    let filter = WslArgumentFilter::for_working_dir(r"\\wsl$\Ubuntu\home\user\repo").unwrap();
    assert_eq!(
        filter.filter(Some("status")),
        "-d Ubuntu -- git -C '/home/user/repo' status"
    );
}

#[test]
fn test_escaped_message_is_requoted() {
    let normalizer = LongOptionNormalizer::new();
    assert_eq!(
        normalizer.normalize(r#"--message="hello \"world\"""#),
        "--message='hello world'"
    );
}
