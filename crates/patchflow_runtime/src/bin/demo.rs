// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless demo: builds a small arithmetic patch and edits it live.

use patchflow_graph::{builtin_registry, Config, Value};
use patchflow_runtime::{Runtime, RuntimeError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("patchflow_runtime=debug".parse().unwrap())
        .add_directive("patchflow_graph=debug".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Patchflow demo v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        tracing::error!("demo failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), RuntimeError> {
    let mut runtime = Runtime::new(builtin_registry());

    let five = runtime.add_node("Number", Config::new().with("value", Value::Number(5.0)))?;
    let three = runtime.add_node("Number", Config::new().with("value", Value::Number(3.0)))?;
    let sum = runtime.add_node("Add", Config::new())?;

    let out_of = |rt: &Runtime, node, port| rt.port(node, port).unwrap();
    runtime.connect(out_of(&runtime, five, "out"), out_of(&runtime, sum, "in-a"))?;
    runtime.connect(out_of(&runtime, three, "out"), out_of(&runtime, sum, "in-b"))?;

    tracing::info!("5 + 3 = {:?}", runtime.query_output(sum));

    runtime.edit_config(five, Config::new().with("value", Value::Number(10.0)))?;
    tracing::info!("after edit, 10 + 3 = {:?}", runtime.query_output(sum));

    let order = runtime
        .execution_order()
        .expect("acyclic patch always orders");
    tracing::info!("execution order: {order:?}");

    Ok(())
}
