use dialect_tts::{DialectEngine, DialectErrorKind, DialectId, DialectProfile, EngineConfig, RewriteMode};

#[test]
fn shanghai_greeting_is_rewritten() {
    let engine = DialectEngine::builtin();
    assert_eq!(
        engine.rewrite("你好，今天天气很好", DialectId::Shanghai).unwrap(),
        "侬好，今朝天气蛮好"
    );
}

#[test]
fn minimal_map_reproduces_the_reference_conversion() {
    let shanghai = DialectProfile::new(DialectId::Shanghai)
        .with_unique_expressions(["侬好"])
        .with_conversion_map([("你好", "侬好"), ("今天", "今朝"), ("很好", "蛮好")]);
    let engine = DialectEngine::new(vec![shanghai], EngineConfig::default()).unwrap();
    assert_eq!(
        engine.rewrite("你好，今天天气很好", DialectId::Shanghai).unwrap(),
        "侬好，今朝天气蛮好"
    );
}

#[test]
fn standard_target_is_a_passthrough() {
    let engine = DialectEngine::builtin();
    for text in ["你好", "", "侬好，今朝天气蛮好", "anything at all"] {
        assert_eq!(engine.rewrite(text, DialectId::Standard).unwrap(), text);
    }
}

#[test]
fn standard_passthrough_needs_no_profile() {
    let shanghai = DialectProfile::new(DialectId::Shanghai).with_unique_expressions(["侬好"]);
    let engine = DialectEngine::new(vec![shanghai], EngineConfig::default()).unwrap();
    assert_eq!(engine.rewrite("你好", DialectId::Standard).unwrap(), "你好");
}

#[test]
fn empty_text_stays_empty() {
    let engine = DialectEngine::builtin();
    for dialect in DialectId::ALL {
        assert_eq!(engine.rewrite("", dialect).unwrap(), "");
    }
}

#[test]
fn dialect_without_rules_is_a_silent_no_op() {
    let engine = DialectEngine::builtin();
    assert_eq!(engine.rewrite("你好", DialectId::Gyeongsang).unwrap(), "你好");
    assert_eq!(engine.rewrite("你好", DialectId::Jeju).unwrap(), "你好");
}

#[test]
fn unconfigured_target_is_an_unknown_dialect_error() {
    let shanghai = DialectProfile::new(DialectId::Shanghai).with_unique_expressions(["侬好"]);
    let engine = DialectEngine::new(vec![shanghai], EngineConfig::default()).unwrap();

    let err = engine.rewrite("你好", DialectId::Jeju).unwrap_err();
    assert_eq!(err.as_inner(), &DialectErrorKind::UnknownDialect("jeju".to_string()));
    assert_eq!(err.error_name(), "UnknownDialectError");
}

#[test]
fn unknown_id_string_is_an_unknown_dialect_error() {
    let engine = DialectEngine::builtin();
    let err = engine.rewrite_named("你好", "nonexistent-dialect-id").unwrap_err();
    assert!(matches!(err.as_inner(), DialectErrorKind::UnknownDialect(id) if id == "nonexistent-dialect-id"));
}

#[test]
fn sichuan_longer_rule_wins_by_order() {
    let engine = DialectEngine::builtin();
    assert_eq!(engine.rewrite("怎么样，这里可以", DialectId::Sichuan).unwrap(), "啷个，这搭要得");
}

// Rules see the output of earlier rules. The built-in 谢谢 -> 谢谢侬 rule
// therefore stacks when fed text that is already Shanghainese.
#[test]
fn cascading_substitution_is_preserved() {
    let engine = DialectEngine::builtin();
    assert_eq!(engine.rewrite("谢谢", DialectId::Shanghai).unwrap(), "谢谢侬");
    assert_eq!(engine.rewrite("谢谢侬", DialectId::Shanghai).unwrap(), "谢谢侬侬");

    let chain = DialectProfile::new(DialectId::Shanghai)
        .with_unique_expressions(["侬"])
        .with_conversion_map([("我们", "阿拉"), ("阿拉", "伊拉")]);
    let engine = DialectEngine::new(vec![chain], EngineConfig::default()).unwrap();
    assert_eq!(engine.rewrite("我们", DialectId::Shanghai).unwrap(), "伊拉");
    assert_eq!(
        engine.rewrite_with_mode("我们", DialectId::Shanghai, RewriteMode::Strict).unwrap(),
        "阿拉"
    );
}

#[test]
fn strict_mode_from_config() {
    let chain = DialectProfile::new(DialectId::Shanghai)
        .with_unique_expressions(["侬"])
        .with_conversion_map([("我们", "阿拉"), ("阿拉", "伊拉")]);
    let config = EngineConfig {
        rewrite_mode: RewriteMode::Strict,
        ..EngineConfig::default()
    };
    let engine = DialectEngine::new(vec![chain], config).unwrap();
    assert_eq!(engine.rewrite("我们和阿拉", DialectId::Shanghai).unwrap(), "阿拉和伊拉");
}

#[test]
fn replacement_is_leftmost_and_non_overlapping() {
    let profile = DialectProfile::new(DialectId::Sichuan)
        .with_unique_expressions(["x"])
        .with_conversion_map([("aa", "b")]);
    let engine = DialectEngine::new(vec![profile], EngineConfig::default()).unwrap();
    assert_eq!(engine.rewrite("aaa", DialectId::Sichuan).unwrap(), "ba");
    assert_eq!(
        engine.rewrite_with_mode("aaa", DialectId::Sichuan, RewriteMode::Strict).unwrap(),
        "ba"
    );
}
