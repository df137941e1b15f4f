use thought_tree::{config, Mark, SearchConfig, SearchError};

#[test]
fn test_config_builder_methods() {
    let config = SearchConfig::default()
        .with_beam_width(4)
        .with_max_depth(3)
        .with_max_proposals(5)
        .with_perspective(Mark::X)
        .with_strict(true);

    assert_eq!(config.beam_width, 4);
    assert_eq!(config.max_depth, 3);
    assert_eq!(config.max_proposals, 5);
    assert_eq!(config.perspective, Mark::X);
    assert!(config.strict);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_default_values() {
    let config = SearchConfig::default();

    assert_eq!(config.beam_width, config::DEFAULT_BEAM_WIDTH);
    assert_eq!(config.beam_width, 2);
    assert_eq!(config.max_depth, 2);
    assert_eq!(config.max_proposals, 100);
    assert_eq!(config.perspective, Mark::O);
    assert!(!config.strict);
}

#[test]
fn test_config_validation() {
    assert!(matches!(
        SearchConfig::default().with_beam_width(0).validate(),
        Err(SearchError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        SearchConfig::default().with_max_proposals(0).validate(),
        Err(SearchError::InvalidConfiguration(_))
    ));
    // Depth zero is a valid root-only evaluation
    assert!(SearchConfig::default().with_max_depth(0).validate().is_ok());
}
