// SPDX-License-Identifier: MIT OR Apache-2.0
//! The builtin node kind catalog.

use crate::catalog::{
    InitAction, KindCategory, KindRegistry, NodeKind, PortSpec, Refresh, UpdateCtx,
};
use crate::config::Config;
use crate::value::{DataType, Value};
use patchflow_media::{MediaKind, ResourceId, ShaderParams};

/// Fragment shader a new `Shader` node starts with: a time-driven wave
/// that remixes the red channel and scales green and blue.
pub const DEFAULT_FRAGMENT_SHADER: &str = r#"precision mediump float;
uniform sampler2D u_texture;
uniform vec2 u_resolution;
uniform float u_time;
uniform float u_param1;
uniform float u_param2;
uniform float u_param3;
varying vec2 vTexCoord;

void main() {
    vec2 uv = vTexCoord;
    vec4 color = texture2D(u_texture, uv);

    float wave = sin(u_time * u_param1 * 2.0) * 0.5 + 0.5;

    color.r = mix(color.r, 1.0 - color.r, wave * u_param1);
    color.g = color.g * u_param2;
    color.b = color.b * u_param3;

    gl_FragColor = color;
}"#;

/// Build a registry holding every builtin kind.
pub fn builtin_registry() -> KindRegistry {
    let mut registry = KindRegistry::new();

    registry.register(NodeKind {
        name: "Add",
        category: KindCategory::Math,
        ports: vec![
            PortSpec::input("in-a", DataType::Number),
            PortSpec::input("in-b", DataType::Number),
            PortSpec::output("out", DataType::Number),
        ],
        default_config: Config::new(),
        update: |ctx| binary_math(ctx, |a, b| a + b),
        init: None,
        refresh: Refresh::Never,
    });

    registry.register(NodeKind {
        name: "Multiply",
        category: KindCategory::Math,
        ports: vec![
            PortSpec::input("in-a", DataType::Number),
            PortSpec::input("in-b", DataType::Number),
            PortSpec::output("out", DataType::Number),
        ],
        default_config: Config::new(),
        update: |ctx| binary_math(ctx, |a, b| a * b),
        init: None,
        refresh: Refresh::Never,
    });

    registry.register(NodeKind {
        name: "Sin",
        category: KindCategory::Math,
        ports: vec![
            PortSpec::input("in", DataType::Number),
            PortSpec::output("out", DataType::Number),
        ],
        default_config: Config::new(),
        update: |ctx| Value::Number(ctx.input("in").number_or(0.0).sin()),
        init: None,
        refresh: Refresh::Never,
    });

    registry.register(NodeKind {
        name: "Time",
        category: KindCategory::Generator,
        ports: vec![PortSpec::output("out", DataType::Number)],
        default_config: Config::new(),
        update: |ctx| Value::Number(ctx.now_seconds()),
        init: None,
        refresh: Refresh::EveryTick,
    });

    registry.register(NodeKind {
        name: "Number",
        category: KindCategory::Generator,
        ports: vec![PortSpec::output("out", DataType::Number)],
        default_config: Config::new().with("value", Value::Number(0.0)),
        update: |ctx| Value::Number(ctx.config().number_or("value", 0.0)),
        init: None,
        refresh: Refresh::Never,
    });

    registry.register(NodeKind {
        name: "Text",
        category: KindCategory::Generator,
        ports: vec![PortSpec::output("out", DataType::Text)],
        default_config: Config::new().with("value", Value::Text(String::new())),
        update: |ctx| Value::Text(ctx.config().text("value").unwrap_or_default().to_string()),
        init: None,
        refresh: Refresh::Never,
    });

    registry.register(NodeKind {
        name: "Image",
        category: KindCategory::Media,
        ports: vec![PortSpec::output("out", DataType::Texture)],
        default_config: Config::new().with("source", Value::Text("/image.png".into())),
        update: media_update,
        init: Some(InitAction::LoadMedia {
            kind: MediaKind::StillImage,
        }),
        refresh: Refresh::Never,
    });

    registry.register(NodeKind {
        name: "Video",
        category: KindCategory::Media,
        ports: vec![PortSpec::output("out", DataType::Texture)],
        default_config: Config::new().with("source", Value::Text("/video.mp4".into())),
        update: media_update,
        init: Some(InitAction::LoadMedia {
            kind: MediaKind::Video,
        }),
        refresh: Refresh::Never,
    });

    registry.register(NodeKind {
        name: "Camera",
        category: KindCategory::Media,
        ports: vec![PortSpec::output("out", DataType::Texture)],
        default_config: Config::new().with("source", Value::Text(String::new())),
        update: media_update,
        init: Some(InitAction::LoadMedia {
            kind: MediaKind::Camera,
        }),
        refresh: Refresh::Never,
    });

    registry.register(NodeKind {
        name: "Shader",
        category: KindCategory::Effects,
        ports: vec![
            PortSpec::input("texture-in", DataType::Texture),
            PortSpec::input("time-in", DataType::Number),
            PortSpec::input("param1-in", DataType::Number),
            PortSpec::input("param2-in", DataType::Number),
            PortSpec::input("param3-in", DataType::Number),
            PortSpec::output("out", DataType::Texture),
        ],
        default_config: Config::new()
            .with("fragment", Value::Text(DEFAULT_FRAGMENT_SHADER.into()))
            .with("param1", Value::Number(1.0))
            .with("param2", Value::Number(1.0))
            .with("param3", Value::Number(1.0)),
        update: shader_update,
        init: None,
        refresh: Refresh::LiveTexture,
    });

    registry.register(NodeKind {
        name: "Output",
        category: KindCategory::Output,
        ports: vec![PortSpec::input("texture-in", DataType::Texture)],
        default_config: Config::new(),
        update: |ctx| ctx.input("texture-in").clone(),
        init: None,
        refresh: Refresh::Never,
    });

    registry
}

/// Shared Add/Multiply logic: with fewer than two present inputs the
/// output is zero, otherwise the op applies to the first two.
fn binary_math(ctx: &mut UpdateCtx<'_>, op: fn(f64, f64) -> f64) -> Value {
    let present: Vec<f64> = ctx
        .inputs()
        .filter(|v| !v.is_absent())
        .map(|v| v.number_or(0.0))
        .collect();
    if present.len() >= 2 {
        Value::Number(op(present[0], present[1]))
    } else {
        Value::Number(0.0)
    }
}

/// Media sources emit the resource handle stored in their config by the
/// ingest loop, `Absent` while loading or failed.
fn media_update(ctx: &mut UpdateCtx<'_>) -> Value {
    match ctx.config().texture("resource") {
        Some(handle) => Value::Texture(handle.clone()),
        None => Value::Absent,
    }
}

fn shader_update(ctx: &mut UpdateCtx<'_>) -> Value {
    let Some(source) = ctx.input("texture-in").as_texture().cloned() else {
        return Value::Absent;
    };

    let time = match ctx.input("time-in").as_number() {
        Some(t) => t,
        None => ctx.now_seconds(),
    };
    let params = ShaderParams {
        time,
        param1: ctx
            .input("param1-in")
            .number_or(ctx.config().number_or("param1", 1.0)),
        param2: ctx
            .input("param2-in")
            .number_or(ctx.config().number_or("param2", 1.0)),
        param3: ctx
            .input("param3-in")
            .number_or(ctx.config().number_or("param3", 1.0)),
    };

    let fragment = ctx
        .config()
        .text("fragment")
        .unwrap_or(DEFAULT_FRAGMENT_SHADER)
        .to_string();
    let output_id = ResourceId::new(format!("shader-{}", ctx.node_id()));

    match ctx.process_image(&source, &fragment, &params, &output_id) {
        Some(handle) => Value::Texture(handle),
        // Skipped output; keep the untouched source flowing.
        None => Value::Texture(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NullServices;
    use crate::port::PortId;

    fn run(kind: &str, configure: impl FnOnce(&mut crate::node::Node)) -> Value {
        let registry = builtin_registry();
        let mut node = registry.instantiate(kind, Config::new()).unwrap();
        configure(&mut node);
        let mut services = NullServices;
        let mut ctx = UpdateCtx::new(&node, &mut services);
        let kind = registry.get(kind).unwrap();
        (kind.update)(&mut ctx)
    }

    #[test]
    fn add_needs_two_present_inputs() {
        let one = run("Add", |node| {
            node.set_input(PortId(0), Value::Number(4.0));
        });
        assert_eq!(one, Value::Number(0.0));

        let both = run("Add", |node| {
            node.set_input(PortId(0), Value::Number(4.0));
            node.set_input(PortId(1), Value::Number(3.0));
        });
        assert_eq!(both, Value::Number(7.0));
    }

    #[test]
    fn multiply_and_sin() {
        let product = run("Multiply", |node| {
            node.set_input(PortId(0), Value::Number(4.0));
            node.set_input(PortId(1), Value::Number(2.5));
        });
        assert_eq!(product, Value::Number(10.0));

        let sine = run("Sin", |node| {
            node.set_input(PortId(0), Value::Number(0.0));
        });
        assert_eq!(sine, Value::Number(0.0));
    }

    #[test]
    fn number_reads_config() {
        let value = run("Number", |node| {
            node.config.set("value", Value::Number(42.0));
        });
        assert_eq!(value, Value::Number(42.0));
    }

    #[test]
    fn media_without_resource_is_absent() {
        assert!(run("Image", |_| {}).is_absent());
        assert!(run("Video", |_| {}).is_absent());
    }

    #[test]
    fn shader_without_texture_is_absent() {
        assert!(run("Shader", |_| {}).is_absent());
    }

    #[test]
    fn shader_passes_source_through_when_processing_declines() {
        let handle = patchflow_media::TextureHandle {
            resource: patchflow_media::ResourceId::new("image-test"),
            origin: patchflow_media::TextureOrigin::Still,
            width: 8,
            height: 8,
        };
        let out = run("Shader", |node| {
            node.set_input(PortId(0), Value::Texture(handle.clone()));
        });
        assert_eq!(out, Value::Texture(handle));
    }

    #[test]
    fn catalog_covers_every_builtin() {
        let registry = builtin_registry();
        for name in [
            "Add", "Multiply", "Sin", "Time", "Number", "Text", "Image", "Video", "Camera",
            "Shader", "Output",
        ] {
            assert!(registry.get(name).is_some(), "missing kind {name}");
        }
    }
}
