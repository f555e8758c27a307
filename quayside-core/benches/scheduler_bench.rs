#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion, Throughput};

use quayside_core::prelude::*;

/// Holds a unit of `dock` for `hold` time units, `rounds` times.
struct Shuttle {
    dock: ResourceId,
    hold: u32,
    rounds: u32,
}

impl Process<()> for Shuttle {
    fn resume(&mut self, wake: Wake, ctx: &mut Context<'_, ()>) -> Result<Yield, SimulationError> {
        match wake {
            Wake::Granted(grant) => {
                ctx.release(grant)?;
                self.rounds -= 1;
                Ok(await_timeout(SimDuration::from(self.hold)))
            }
            _ if self.rounds == 0 => Ok(Yield::Done),
            _ => Ok(await_resource(self.dock)),
        }
    }
}

fn bench_event_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_queue");
    for size in [128usize, 1024, 16384] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("push_pop_{size}"), |b| {
            b.iter(|| {
                let mut sim = Simulation::new((), NullSink);
                let dock = sim.add_resource("idle", 1);
                for n in 0..size {
                    sim.spawn("tick", Shuttle {
                        dock,
                        hold: (n % 7) as u32,
                        rounds: 0,
                    });
                }
                black_box(sim.run().ok());
            });
        });
    }
    group.finish();
}

fn bench_contended_resource(c: &mut Criterion) {
    c.bench_function("contended_resource", |b| {
        b.iter(|| {
            let mut sim = Simulation::new((), NullSink);
            let dock = sim.add_resource("dock", 2);
            for n in 0..64u32 {
                sim.spawn(format!("shuttle-{n}"), Shuttle {
                    dock,
                    hold: 1 + n % 3,
                    rounds: 50,
                });
            }
            black_box(sim.run().ok());
        })
    });
}

criterion_group!(benches, bench_event_queue, bench_contended_resource);
criterion_main!(benches);
