use std::io::{self, Write};
use std::time::Instant;

/// Progreso por SKU procesado para las etapas del pipeline
pub struct ProgressTracker {
    start_time: Instant,
    total_expected: u64,
    total_processed: u64,
    report_interval: u64,
}

impl ProgressTracker {
    pub fn new(total_expected: u64, report_interval: u64) -> Self {
        Self {
            start_time: Instant::now(),
            total_expected,
            total_processed: 0,
            report_interval: report_interval.max(1),
        }
    }

    pub fn tick(&mut self) {
        self.total_processed += 1;

        if self.total_processed % self.report_interval == 0 {
            self.report();
        }
    }

    fn report(&self) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        print!(
            "\r📊 SKUs: {}/{} | Time: {:.1}s",
            self.total_processed, self.total_expected, elapsed
        );
        io::stdout().flush().ok();
    }

    /// Finaliza el progreso sin mensaje personalizado
    pub fn finish(&self) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            self.total_processed as f64 / elapsed
        } else {
            0.0
        };

        println!(
            "\r✅ Complete: {} SKUs in {:.1}s ({:.0} SKU/s)",
            self.total_processed, elapsed, rate
        );
    }
}
