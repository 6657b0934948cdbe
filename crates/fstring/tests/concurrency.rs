//! Rendering from many threads against one engine.

use std::sync::Arc;
use std::thread;

use fstring::{value_map, Engine, EngineConfig, Introspect, RenderCacheMode, Value};

#[derive(Introspect)]
#[introspect(methods(label))]
struct Item {
    id: u64,
    price: f64,
}

impl Item {
    fn label(&self) -> String {
        format!("item-{}", self.id)
    }
}

const THREADS: u64 = 8;
const ROUNDS: u64 = 200;

fn run(engine: Arc<Engine>) -> Vec<Vec<String>> {
    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                (0..ROUNDS)
                    .map(|round| {
                        let id = worker * ROUNDS + round;
                        let values = value_map! {
                            "item" => Value::object(Item { id, price: id as f64 / 4.0 }),
                        };
                        engine
                            .render("{item.label()} costs {item.price:>10.2f}", &values)
                            .unwrap()
                    })
                    .collect::<Vec<String>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn compiled_mode_renders_every_value() {
    let engine = Arc::new(Engine::with_config(
        EngineConfig::new().render_cache(RenderCacheMode::Compiled),
    ));
    let results = run(Arc::clone(&engine));

    for (worker, outputs) in results.iter().enumerate() {
        for (round, output) in outputs.iter().enumerate() {
            let id = worker as u64 * ROUNDS + round as u64;
            assert_eq!(
                output,
                &format!("item-{} costs {:>10.2}", id, id as f64 / 4.0)
            );
        }
    }

    let stats = engine.stats();
    assert_eq!(stats.compiled, 1);
    assert_eq!(stats.accessors, 2);
}

#[test]
fn output_mode_returns_one_result_per_key() {
    let engine = Arc::new(Engine::new());
    let results = run(Arc::clone(&engine));

    // Every thread races to fill the same entry; whoever wins, all later
    // renders return that entry.
    let cached = results
        .iter()
        .map(|outputs| outputs.last().unwrap())
        .collect::<Vec<_>>();
    assert!(cached.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(engine.stats().rendered, 1);
}

#[test]
fn shared_engine_across_templates() {
    let engine = Arc::new(Engine::with_config(
        EngineConfig::new().render_cache(RenderCacheMode::Compiled),
    ));
    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let template = format!("{{{{{}}}}} {{n:>{}}}", worker, worker + 1);
                engine
                    .render(&template, &value_map! { "n" => worker })
                    .unwrap()
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        let output = handle.join().unwrap();
        assert_eq!(output, format!("{{{}}} {:>2$}", worker, worker, worker + 1));
    }
    assert_eq!(engine.stats().compiled, THREADS as usize);
}
