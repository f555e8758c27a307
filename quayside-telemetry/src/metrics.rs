//! ## quayside-telemetry::metrics
//! **Prometheus counters and a berth-wait histogram**
//!
//! One recorder per process. Sweep workers share it through `Clone`; the
//! prometheus handles are reference counted.

use prometheus::{Counter, Histogram, HistogramOpts, IntCounter, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub processed_events: IntCounter,
    pub vessel_arrivals: IntCounter,
    pub vessel_departures: IntCounter,
    pub skipped_arrivals: IntCounter,
    pub containers_unloaded: IntCounter,
    pub truck_deliveries: IntCounter,
    pub completed_runs: Counter,
    pub berth_wait: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let processed_events =
            IntCounter::new("quayside_events_total", "Scheduler events processed")?;
        let vessel_arrivals =
            IntCounter::new("quayside_vessel_arrivals_total", "Vessels that arrived")?;
        let vessel_departures =
            IntCounter::new("quayside_vessel_departures_total", "Vessels that left")?;
        let skipped_arrivals = IntCounter::new(
            "quayside_skipped_arrivals_total",
            "Arrivals turned away by the berth queue check",
        )?;
        let containers_unloaded = IntCounter::new(
            "quayside_containers_unloaded_total",
            "Containers unloaded by quay cranes",
        )?;
        let truck_deliveries = IntCounter::new(
            "quayside_truck_deliveries_total",
            "Containers delivered to the yard",
        )?;
        let completed_runs = Counter::new("quayside_runs_total", "Completed simulation runs")?;
        let berth_wait = Histogram::with_opts(
            HistogramOpts::new(
                "quayside_berth_wait_time",
                "Simulated time between arrival and berthing",
            )
            .buckets(vec![0.0, 10.0, 60.0, 300.0, 1_000.0, 5_000.0]),
        )?;

        registry.register(Box::new(processed_events.clone()))?;
        registry.register(Box::new(vessel_arrivals.clone()))?;
        registry.register(Box::new(vessel_departures.clone()))?;
        registry.register(Box::new(skipped_arrivals.clone()))?;
        registry.register(Box::new(containers_unloaded.clone()))?;
        registry.register(Box::new(truck_deliveries.clone()))?;
        registry.register(Box::new(completed_runs.clone()))?;
        registry.register(Box::new(berth_wait.clone()))?;

        Ok(Self {
            registry,
            processed_events,
            vessel_arrivals,
            vessel_departures,
            skipped_arrivals,
            containers_unloaded,
            truck_deliveries,
            completed_runs,
            berth_wait,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn observe_berth_wait(&self, wait: f64) {
        self.berth_wait.observe(wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposition_contains_every_series() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.processed_events.inc_by(17);
        metrics.vessel_arrivals.inc();
        metrics.observe_berth_wait(42.0);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("quayside_events_total 17"));
        assert!(text.contains("quayside_vessel_arrivals_total 1"));
        assert!(text.contains("quayside_berth_wait_time_count 1"));
        assert!(text.contains("quayside_truck_deliveries_total 0"));
    }

    #[test]
    fn clones_share_counters() {
        let metrics = MetricsRecorder::new().unwrap();
        let worker = metrics.clone();
        worker.completed_runs.inc();
        assert_eq!(metrics.completed_runs.get(), 1.0);
    }
}
