use atomcss_lib::Context;
use atomcss_lib::emit::{WriteOutcome, write_if_changed};
use atomcss_lib::manifest::ArtifactKind;
use atomcss_lib::registration::{BuildPlan, RegistrationError};

use super::common::temp_config;

const PLAN: &str = r#"[
  {"kind": "consts", "scope": "app", "namespace": "space", "values": {"sm": "4px", "lg": "16px"}},
  {"kind": "var", "scope": "app", "namespace": "colors", "name": "ink", "value": {"default": "black", "@media (prefers-color-scheme: dark)": "white"}},
  {"kind": "keyframes", "scope": "app", "name": "fade", "frames": {"from": {"opacity": 0}, "to": {"opacity": 1}}},
  {"kind": "class", "scope": "app", "name": "card", "declarations": {
    "color": {"$ref": {"kind": "var", "scope": "app", "name": "colors.ink"}},
    "padding": {"$ref": {"kind": "const", "scope": "app", "name": "space.lg"}},
    "animation_name": {"$ref": {"kind": "keyframes", "scope": "app", "name": "fade"}}
  }},
  {"kind": "theme", "scope": "app", "namespace": "colors", "name": "inverted", "overrides": {"ink": "white"}}
]"#;

#[test]
fn plan_builds_a_stylesheet() {
  let (_temp, config) = temp_config();
  let ctx = Context::new(config);

  let report = BuildPlan::from_json(PLAN).unwrap().apply(&ctx).unwrap();
  let kinds: Vec<ArtifactKind> = report.defined.iter().map(|(kind, _, _)| *kind).collect();
  assert_eq!(
    kinds,
    vec![
      ArtifactKind::Const,
      ArtifactKind::Var,
      ArtifactKind::Keyframes,
      ArtifactKind::Class,
      ArtifactKind::Theme
    ]
  );

  let css = ctx.render().unwrap();
  assert!(css.contains("padding:16px"), "{css}");
  assert!(css.contains("@media (prefers-color-scheme: dark){:root{"), "{css}");
  assert!(css.contains("opacity:0"), "{css}");

  let out = &ctx.config().output_path;
  assert_eq!(write_if_changed(out, &css).unwrap(), WriteOutcome::Written);
  assert_eq!(write_if_changed(out, &css).unwrap(), WriteOutcome::Unchanged);
}

#[test]
fn reapplying_a_plan_is_free() {
  let (_temp, config) = temp_config();
  let plan = BuildPlan::from_json(PLAN).unwrap();

  plan.apply(&Context::new(config.clone())).unwrap();
  let again = plan.apply(&Context::new(config)).unwrap();
  assert_eq!(again.writes, 0);
}

#[test]
fn plan_file_errors_name_the_path() {
  let (temp, _config) = temp_config();
  let path = temp.path().join("missing.json");
  let err = BuildPlan::load(&path).unwrap_err();
  assert!(matches!(err, RegistrationError::Read { .. }));
  assert!(err.to_string().contains("missing.json"));
}
