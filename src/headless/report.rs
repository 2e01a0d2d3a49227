//! Training run reports
//!
//! Every run appends a short record to the results file. The output
//! directory also gets per-generation stats as JSON and an HTML page with a
//! fitness chart and the captured GIFs.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use flapper_core::RunStats;

use super::training_env::TrainingStats;

/// ctime-style timestamp, e.g. `Tue Mar  5 14:07:09 2024`
const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// A GIF written during training
#[derive(Debug, Clone)]
pub struct CapturedGif {
    pub generation: usize,
    /// File name relative to the output directory
    pub file_name: String,
    pub score: u32,
}

/// Writes the results record and the report files of a training run
pub struct ReportGenerator {
    output_dir: PathBuf,
}

/// One results record
pub fn results_entry(stats: &RunStats, date: &NaiveDateTime) -> String {
    format!(
        "Date: {} \nGenerations: {}\nMax score: {}\n\n",
        date.format(DATE_FORMAT),
        stats.generations_run,
        stats.max_score
    )
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the GIF of a generation goes
    pub fn gif_file_name(generation: usize) -> String {
        format!("gen_{:04}.gif", generation)
    }

    /// Append a record to the results file, creating it if needed
    pub fn append_results(
        &self,
        results_file: &Path,
        stats: &RunStats,
        date: &NaiveDateTime,
    ) -> Result<()> {
        if let Some(parent) = results_file.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create results directory")?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(results_file)
            .with_context(|| format!("Failed to open {}", results_file.display()))?;
        file.write_all(results_entry(stats, date).as_bytes())
            .context("Failed to write results")?;
        log::info!("Results appended to {}", results_file.display());
        Ok(())
    }

    /// Write `stats.json` and `index.html` into the output directory
    pub fn generate_final_report(
        &self,
        stats: &RunStats,
        stats_history: &[TrainingStats],
        gifs: &[CapturedGif],
    ) -> Result<()> {
        fs::create_dir_all(&self.output_dir).context("Failed to create output directory")?;

        let json = serde_json::to_string_pretty(stats_history)
            .context("Failed to serialize generation stats")?;
        fs::write(self.output_dir.join("stats.json"), json)
            .context("Failed to write stats JSON")?;

        let html = self.generate_html(stats, stats_history, gifs);
        let path = self.output_dir.join("index.html");
        fs::write(&path, html).context("Failed to write report HTML")?;

        log::info!("Report generated: {}", path.display());
        Ok(())
    }

    fn generate_html(
        &self,
        stats: &RunStats,
        stats_history: &[TrainingStats],
        gifs: &[CapturedGif],
    ) -> String {
        let fitness_chart = self.generate_fitness_svg(stats_history);
        let gallery: String = gifs
            .iter()
            .map(|gif| {
                format!(
                    r#"<figure><img src="{file}" alt="generation {generation}"><figcaption>Generation {generation}, score {score}</figcaption></figure>"#,
                    file = gif.file_name,
                    generation = gif.generation,
                    score = gif.score,
                )
            })
            .collect::<Vec<_>>()
            .join("\n        ");
        let best_fitness = stats_history
            .iter()
            .map(|s| s.best_fitness)
            .fold(f32::NEG_INFINITY, f32::max);

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Flapper Training Report</title>
    <style>
        body {{ font-family: sans-serif; max-width: 960px; margin: 0 auto; padding: 20px; background: #1a1a2e; color: #eee; }}
        h1, h2 {{ color: #4ecdc4; }}
        figure {{ display: inline-block; margin: 10px; }}
        img {{ image-rendering: pixelated; border: 1px solid #4ecdc4; }}
    </style>
</head>
<body>
    <h1>Flapper Training Report</h1>
    <p>Generations: {generations} &middot; Max score: {max_score} &middot; Best fitness: {best_fitness} &middot; Ticks simulated: {total_ticks}</p>
    <h2>Fitness</h2>
    {fitness_chart}
    <h2>Captured generations</h2>
    <div>
        {gallery}
    </div>
</body>
</html>
"#,
            generations = stats.generations_run,
            max_score = stats.max_score,
            best_fitness = if stats_history.is_empty() {
                "-".to_string()
            } else {
                format!("{:.1}", best_fitness)
            },
            total_ticks = stats.total_ticks,
            fitness_chart = fitness_chart,
            gallery = gallery,
        )
    }

    /// SVG chart of best and mean fitness per generation
    fn generate_fitness_svg(&self, stats_history: &[TrainingStats]) -> String {
        if stats_history.is_empty() {
            return "<p>No data</p>".to_string();
        }

        let width = 600;
        let height = 200;
        let padding = 40;

        let max_fitness = stats_history
            .iter()
            .map(|s| s.best_fitness)
            .fold(0.0f32, f32::max);
        let max_fitness = if max_fitness > 0.0 { max_fitness } else { 1.0 };
        let plot_y = |fitness: f32| {
            height as f32
                - padding as f32
                - (fitness.max(0.0) / max_fitness) * (height - 2 * padding) as f32
        };

        let mut best_path = String::new();
        let mut mean_path = String::new();
        for (i, stats) in stats_history.iter().enumerate() {
            let x = padding as f32
                + (i as f32 / stats_history.len() as f32) * (width - 2 * padding) as f32;
            let cmd = if i == 0 { "M" } else { " L" };
            best_path.push_str(&format!("{}{:.1},{:.1}", cmd, x, plot_y(stats.best_fitness)));
            mean_path.push_str(&format!("{}{:.1},{:.1}", cmd, x, plot_y(stats.mean_fitness)));
        }

        format!(
            r#"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}">
    <line x1="{padding}" y1="{padding}" x2="{padding}" y2="{y_bottom}" stroke="gray" stroke-width="1"/>
    <line x1="{padding}" y1="{y_bottom}" x2="{x_right}" y2="{y_bottom}" stroke="gray" stroke-width="1"/>
    <path d="{mean_path}" fill="none" stroke="gray" stroke-width="2"/>
    <path d="{best_path}" fill="none" stroke="cyan" stroke-width="2"/>
    <text x="{padding}" y="{label_y}" fill="gray" font-size="12">0</text>
    <text x="{padding}" y="{top_label}" fill="gray" font-size="12">{max_fitness:.1}</text>
    <text x="{mid_x}" y="{xlabel_y}" fill="gray" font-size="12" text-anchor="middle">Generation</text>
</svg>"#,
            y_bottom = height - padding,
            x_right = width - padding,
            label_y = height - padding + 15,
            top_label = padding - 5,
            mid_x = width / 2,
            xlabel_y = height - 5,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flapper_core::GenerationStatus;

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap()
    }

    fn run_stats() -> RunStats {
        RunStats {
            generations_run: 12,
            max_score: 31,
            total_ticks: 5000,
        }
    }

    fn history() -> Vec<TrainingStats> {
        (0..3)
            .map(|g| TrainingStats {
                generation: g,
                status: GenerationStatus::Complete,
                score: g as u32,
                ticks: 100 * (g as u64 + 1),
                best_fitness: 10.0 * (g as f32 + 1.0),
                mean_fitness: 2.0 * (g as f32 + 1.0),
                worst_fitness: -0.9,
                collisions: 30,
                out_of_bounds: 20,
            })
            .collect()
    }

    #[test]
    fn test_results_entry_format() {
        assert_eq!(
            results_entry(&run_stats(), &date()),
            "Date: Tue Mar  5 14:07:09 2024 \nGenerations: 12\nMax score: 31\n\n"
        );
    }

    #[test]
    fn test_results_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.txt");
        let report = ReportGenerator::new(dir.path());

        report.append_results(&path, &run_stats(), &date()).unwrap();
        report
            .append_results(&path, &RunStats::default(), &date())
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("Date: ").count(), 2);
        assert!(text.ends_with("Generations: 0\nMax score: 0\n\n"));
        assert!(text.starts_with("Date: Tue Mar  5 14:07:09 2024 \nGenerations: 12\n"));
    }

    #[test]
    fn test_final_report_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = ReportGenerator::new(dir.path().join("out"));
        let gifs = vec![CapturedGif {
            generation: 2,
            file_name: ReportGenerator::gif_file_name(2),
            score: 4,
        }];

        report
            .generate_final_report(&run_stats(), &history(), &gifs)
            .unwrap();

        let json = fs::read_to_string(report.output_dir().join("stats.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let generations = parsed.as_array().unwrap();
        assert_eq!(generations.len(), 3);
        assert_eq!(generations[2]["best_fitness"], 30.0);
        assert_eq!(generations[1]["status"], "Complete");

        let html = fs::read_to_string(report.output_dir().join("index.html")).unwrap();
        assert!(html.contains("gen_0002.gif"));
        assert!(html.contains("Max score: 31"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn test_empty_history_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = ReportGenerator::new(dir.path());
        report
            .generate_final_report(&RunStats::default(), &[], &[])
            .unwrap();
        let html = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(html.contains("No data"));
        assert!(html.contains("Best fitness: -"));
    }
}
