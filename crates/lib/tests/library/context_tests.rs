use atomcss_lib::Context;
use atomcss_lib::StyleError;
use atomcss_lib::define::VarSpec;
use atomcss_lib::manifest::ArtifactKind;
use atomcss_lib::value::{RawValue, Reference};

use super::common::{decls, temp_config};

#[test]
fn definitions_persist_across_contexts() {
  let (_temp, config) = temp_config();

  let first = Context::new(config.clone());
  let class = first.define_class("app", "row", &decls(&[("display", "flex".into())])).unwrap();
  assert_eq!(class, "x78zum5");

  let second = Context::new(config);
  assert_eq!(second.lookup_class("app", "row").unwrap(), "x78zum5");
  assert_eq!(second.render().unwrap(), ".x78zum5{display:flex}\n");
}

#[test]
fn identical_redefinition_does_not_write() {
  let (_temp, config) = temp_config();
  let ctx = Context::new(config);
  let declarations = decls(&[("color", "red".into()), ("padding", RawValue::Int(4))]);

  ctx.define_class("app", "box", &declarations).unwrap();
  let modified = std::fs::metadata(&ctx.config().manifest_path).unwrap().modified().unwrap();
  ctx.define_class("app", "box", &declarations).unwrap();

  assert_eq!(ctx.writes(), 1);
  assert_eq!(
    std::fs::metadata(&ctx.config().manifest_path).unwrap().modified().unwrap(),
    modified
  );
}

#[test]
fn references_resolve_through_the_manifest() {
  let (_temp, config) = temp_config();
  let ctx = Context::new(config);

  let var = ctx.define_var("app", "colors", "accent", &VarSpec::plain("tomato")).unwrap();
  ctx
    .define_class(
      "app",
      "accent",
      &decls(&[("color", Reference::var("app", "colors", "accent").into())]),
    )
    .unwrap();

  let def = ctx.class_def("app", "accent").unwrap();
  assert_eq!(def.rules[0].value, var);
}

#[test]
fn missing_reference_leaves_manifest_untouched() {
  let (_temp, config) = temp_config();
  let ctx = Context::new(config);

  let err = ctx
    .define_class(
      "app",
      "ghost",
      &decls(&[("color", Reference::var("app", "colors", "missing").into())]),
    )
    .unwrap_err();

  assert!(matches!(err, StyleError::UnknownReference { kind: ArtifactKind::Var, .. }));
  assert_eq!(ctx.writes(), 0);
  assert!(!ctx.config().manifest_path.exists());
}

#[test]
fn forks_commit_only_when_absorbed() {
  let (_temp, config) = temp_config();
  let ctx = Context::new(config);
  ctx.define_class("app", "row", &decls(&[("display", "flex".into())])).unwrap();

  let fork = ctx.fork().unwrap();
  fork.define_class("app", "col", &decls(&[("flex_direction", "column".into())])).unwrap();
  assert!(ctx.lookup_class("app", "col").is_err());

  assert!(ctx.absorb(fork).unwrap());
  assert!(ctx.lookup_class("app", "col").is_ok());
  assert_eq!(ctx.manifest().unwrap().stats().classes, 2);
}

#[test]
fn merge_prefers_later_classes() {
  let (_temp, config) = temp_config();
  let ctx = Context::new(config);
  ctx
    .define_class("app", "base", &decls(&[("color", "red".into()), ("display", "block".into())]))
    .unwrap();
  let accent = ctx.define_class("app", "accent", &decls(&[("color", "blue".into())])).unwrap();

  let merged = ctx.merge(&[("app", "base"), ("app", "accent")]).unwrap();
  assert!(merged.split(' ').any(|c| c == accent));
  assert_eq!(merged.split(' ').count(), 2);
}

#[test]
fn rtl_keyframes_are_rendered_for_logical_animations() {
  let (_temp, config) = temp_config();
  let ctx = Context::new(config);
  let name = ctx
    .define_keyframes(
      "app",
      "enter",
      &[
        ("from".to_string(), decls(&[("margin_inline_start", RawValue::Int(-20))])),
        ("to".to_string(), decls(&[("margin_inline_start", RawValue::Int(0))])),
      ],
    )
    .unwrap();

  let css = ctx.render().unwrap();
  assert!(css.contains(&format!("@keyframes {name}{{")), "{css}");
  assert!(css.contains(&format!("@keyframes {name}-rtl{{")), "{css}");
}
