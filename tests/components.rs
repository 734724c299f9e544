//! Integration tests for component tags

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use slotted::value::data_from_json;
use slotted::{
    BindingError, Component, ComponentDescriptor, ContextData, Engine, EngineConfig, Library,
    ParseError, RenderError, Signature, SlotMap, Template, Value,
};

struct Hr;
impl Component for Hr {}

struct Details;
impl Component for Details {}

struct Button;
impl Component for Button {}

struct Alert;
impl Component for Alert {
    fn signature(&self) -> Signature {
        Signature::strict()
            .required("message")
            .optional("level", "info")
    }
}

struct Section;
impl Component for Section {
    fn context_data(&self, _slots: &SlotMap, _args: ContextData) -> Result<ContextData, BindingError> {
        Ok(ContextData::new())
    }
}

fn engine() -> Engine {
    let mut components = Library::new();
    components.inline_component(ComponentDescriptor::new(Hr));
    components.block_component(ComponentDescriptor::new(Details));
    components.component(ComponentDescriptor::new(Button));
    components.component(ComponentDescriptor::new(Alert));
    components.component(ComponentDescriptor::new(Section));

    let mut engine = Engine::new();
    engine.add_library("components", components);
    engine
        .add_template("components/hr.html", "<hr>")
        .add_template(
            "components/details.html",
            "<details><summary>{{ slots.summary }}</summary>{{ slot }}</details>",
        )
        .add_template(
            "components/button.html",
            "<button>{{ value|default:slot }}</button>",
        )
        .add_template(
            "components/alert.html",
            r#"<div class="{{ level }}">{{ message }}</div>"#,
        )
        .add_template("components/section.html", "<section>{{ slot }}</section>");
    engine
}

fn render(template: &str) -> Result<String, RenderError> {
    render_with(template, json!({}))
}

fn render_with(template: &str, data: serde_json::Value) -> Result<String, RenderError> {
    let source = format!("{{% load components %}}{}", template);
    let data = data_from_json(data).expect("data must be an object");
    engine().render_str(&source, data)
}

#[test]
fn test_inline_and_block_forms() {
    assert_eq!(render("{% button/ %}").unwrap(), "<button></button>");
    assert_eq!(render("{% button %}{% /button %}").unwrap(), "<button></button>");
}

#[test]
fn test_inline_only_component() {
    let err = render("{% hr %}{% /hr %}").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"error compiling template '<string>': Invalid block tag on line 1: 'hr'"
    );
    assert_eq!(render("{% hr/ %}").unwrap(), "<hr>");
}

#[test]
fn test_block_only_component() {
    let err = render("{% details/ %}").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"error compiling template '<string>': Invalid block tag on line 1: 'details/'"
    );
    assert_eq!(
        render("{% details %}{% /details %}").unwrap(),
        "<details><summary></summary></details>"
    );
}

#[test]
fn test_components_require_load() {
    let err = engine().render_str("{% hr/ %}", ContextData::new()).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Compile {
            error: ParseError::InvalidBlockTag { .. },
            ..
        }
    ));
}

#[test]
fn test_default_slot() {
    assert_eq!(
        render("{% button %}the default <b>slot</b>{% /button %}").unwrap(),
        "<button>the default <b>slot</b></button>"
    );
}

#[test]
fn test_named_slot() {
    let out = render(
        "{% details %}{% slot summary %}the <b>summary</b>{% /slot %}the default <b>slot</b>{% /details %}",
    )
    .unwrap();
    assert_eq!(
        out,
        "<details><summary>the <b>summary</b></summary>the default <b>slot</b></details>"
    );
}

#[test]
fn test_keyword_args() {
    assert_eq!(
        render("{% button/ value='Save' %}").unwrap(),
        "<button>Save</button>"
    );
}

#[test]
fn test_arguments_are_escaped_but_slots_are_not() {
    assert_eq!(
        render_with(
            "{% button value=label %}<i>ignored</i>{% /button %}",
            json!({"label": "<Save>"})
        )
        .unwrap(),
        "<button>&lt;Save&gt;</button>"
    );
}

#[test]
fn test_arguments_resolve_against_call_site_scope() {
    let out = render_with(
        "{% for item in items %}{% button/ value=forloop.counter %}{% endfor %}",
        json!({"items": ["a", "b", "c"]}),
    )
    .unwrap();
    assert_eq!(out, "<button>1</button><button>2</button><button>3</button>");
}

#[test]
fn test_slots_close_over_call_site_scope() {
    let out = render_with(
        "{% for name in names %}{% section %}{{ name }}{% /section %}{% endfor %}",
        json!({"names": ["x", "y"]}),
    )
    .unwrap();
    assert_eq!(out, "<section>x</section><section>y</section>");
}

#[test]
fn test_missing_required_argument() {
    let err = render("{% alert/ %}").unwrap_err();
    match &err {
        RenderError::Validation(validation) => assert_eq!(validation.component, "alert"),
        other => panic!("Expected validation error, got {:?}", other),
    }
    insta::assert_snapshot!(err.to_string(), @"alert component missing required argument 'message'");
}

#[test]
fn test_unexpected_argument() {
    let err = render(r#"{% alert/ message="Hi" style="x" %}"#).unwrap_err();
    match &err {
        RenderError::Validation(validation) => {
            assert_eq!(validation.component, "alert");
            assert_eq!(validation.cause, BindingError::Unexpected("style".to_string()));
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[test]
fn test_optional_argument_default() {
    assert_eq!(
        render(r#"{% alert/ message="Hi" %}"#).unwrap(),
        r#"<div class="info">Hi</div>"#
    );
    assert_eq!(
        render(r#"{% alert/ message="Hi" level="error" %}"#).unwrap(),
        r#"<div class="error">Hi</div>"#
    );
}

#[test]
fn test_section_renders_default_slot() {
    assert_eq!(
        render("{% section %}content{% /section %}").unwrap(),
        "<section>content</section>"
    );
}

#[test]
fn test_section_contract_drops_arguments() {
    let mut engine = engine();
    engine.add_template(
        "components/section.html",
        "<section data-x=\"{{ x }}\">{{ slots.slot }}</section>",
    );
    let out = engine
        .render_str(
            "{% load components %}{% section x=1 %}content{% /section %}",
            ContextData::new(),
        )
        .unwrap();
    assert_eq!(out, "<section data-x=\"\">content</section>");
}

#[test]
fn test_namespaced_component() {
    let mut library = Library::new();
    library.component(ComponentDescriptor::named("bar").with_namespace("foo"));
    let mut engine = Engine::new();
    engine.add_builtins(library);
    engine.add_template("components/foo/bar.html", "[{{ slot }}]");

    assert_eq!(
        engine.render_str("{% foo:bar/ %}", ContextData::new()).unwrap(),
        "[]"
    );
    assert_eq!(
        engine
            .render_str("{% foo:bar %}x{% /foo:bar %}", ContextData::new())
            .unwrap(),
        "[x]"
    );
}

#[test]
fn test_nested_components() {
    let out = render("{% section %}{% button/ value='Go' %}{% /section %}").unwrap();
    assert_eq!(out, "<section><button>Go</button></section>");
}

#[test]
fn test_component_template_uses_components() {
    let mut engine = engine();
    engine.add_template(
        "components/section.html",
        "{% load components %}<section>{% button %}{{ slot }}{% /button %}</section>",
    );
    let out = engine
        .render_str(
            "{% load components %}{% section %}inner{% /section %}",
            ContextData::new(),
        )
        .unwrap();
    assert_eq!(out, "<section><button>inner</button></section>");
}

#[test]
fn test_missing_component_template() {
    let mut library = Library::new();
    library.component(ComponentDescriptor::named("ghost"));
    let mut engine = Engine::new();
    engine.add_builtins(library);

    let err = engine.render_str("{% ghost/ %}", ContextData::new()).unwrap_err();
    match err {
        RenderError::TemplateNotFound(err) => {
            assert_eq!(err.name, "components/ghost.html");
            assert_eq!(err.tried, vec!["<memory>/components/ghost.html".to_string()]);
        }
        other => panic!("Expected TemplateNotFound, got {:?}", other),
    }
}

#[test]
fn test_self_referential_component_hits_recursion_limit() {
    let mut library = Library::new();
    library.component(ComponentDescriptor::named("loop"));
    let mut engine = Engine::with_config(EngineConfig::default().with_max_depth(5));
    engine.add_builtins(library);
    engine.add_template("components/loop.html", "{% loop/ %}");

    let err = engine.render_str("{% loop/ %}", ContextData::new()).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"recursion limit of 5 exceeded while rendering 'components/loop.html'"
    );
}

#[test]
fn test_duplicate_registration_last_wins() {
    let mut library = Library::new();
    library.component(ComponentDescriptor::named("card").with_template("first.html"));
    library.component(ComponentDescriptor::named("card").with_template("second.html"));
    let mut engine = Engine::new();
    engine.add_builtins(library);
    engine.add_template("first.html", "first");
    engine.add_template("second.html", "second");

    assert_eq!(
        engine.render_str("{% card/ %}", ContextData::new()).unwrap(),
        "second"
    );
}

#[test]
fn test_component_code_sees_slots() {
    struct Card;
    impl Component for Card {
        fn context_data(&self, slots: &SlotMap, mut args: ContextData) -> Result<ContextData, BindingError> {
            args.insert(
                "has_title".to_string(),
                Value::Bool(slots.is_filled("title")),
            );
            Ok(args)
        }
    }

    let mut library = Library::new();
    library.component(ComponentDescriptor::new(Card));
    let mut engine = Engine::new();
    engine.add_builtins(library);
    engine.add_template(
        "components/card.html",
        "{% if has_title %}<h1>{{ slots.title }}</h1>{% endif %}{{ slot }}",
    );

    let with_title = engine
        .render_str(
            "{% card %}{% slot title %}T{% /slot %}body{% /card %}",
            ContextData::new(),
        )
        .unwrap();
    assert_eq!(with_title, "<h1>T</h1>body");

    let without = engine
        .render_str("{% card %}body{% /card %}", ContextData::new())
        .unwrap();
    assert_eq!(without, "body");
}

#[test]
fn test_engine_extension_applies_to_registered_components() {
    let mut library = Library::new();
    library.component(ComponentDescriptor::named("card"));
    library.component(ComponentDescriptor::named("badge").with_extension("html"));
    let mut engine = Engine::with_config(EngineConfig::default().with_extension("jinja"));
    engine.add_builtins(library);
    engine
        .add_template("components/card.jinja", "[card]")
        .add_template("components/badge.html", "[badge]");

    assert_eq!(
        engine.render_str("{% card/ %}{% badge/ %}", ContextData::new()).unwrap(),
        "[card][badge]"
    );
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_engine_and_template_are_send_sync() {
    assert_send_sync::<Engine>();
    assert_send_sync::<Template>();
}

#[test]
fn test_concurrent_renders_of_one_template() {
    let engine = engine();
    let template = Arc::new(
        engine
            .compile_named(
                "page.html",
                "{% load components %}{% for n in names %}{% section %}{{ n }}{% /section %}{% endfor %}",
            )
            .expect("compile"),
    );

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = &engine;
                let template = Arc::clone(&template);
                scope.spawn(move || {
                    let data = data_from_json(json!({"names": [format!("a{}", i), format!("b{}", i)]}))
                        .expect("object");
                    engine.render_template(&template, data).expect("render")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("render thread"))
            .collect()
    });

    for (i, output) in outputs.iter().enumerate() {
        assert_eq!(
            output,
            &format!("<section>a{i}</section><section>b{i}</section>")
        );
    }
    assert_eq!(engine.cached_templates(), 1);
}
