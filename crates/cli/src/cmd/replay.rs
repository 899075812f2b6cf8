//! Replay an animator project's action log

use animator::{Action, Animator, Project};
use anyhow::{Context, Result};
use cli_lib::settings;
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Instant;

pub struct ReplayOptions {
    pub duration: Option<f64>,
    pub undo: usize,
    pub frame: Option<u32>,
    pub save: bool,
    pub verify: bool,
}

pub async fn run(root: &Path, options: ReplayOptions) -> Result<()> {
    let config = settings::load()?;
    let project = Project::open(root)
        .with_context(|| format!("Failed to open project at {}", root.display()))?;

    let started = Instant::now();
    let journal = project
        .load_journal(config.animator)
        .context("Failed to load action log")?;
    let load_time = started.elapsed();

    // Without an audio duration the playhead may reach the last drawn frame
    let max_frame = match options.duration {
        Some(duration) => project.config().max_frame(duration),
        None => journal.actions().iter().map(|a| a.frame()).max().unwrap_or(0),
    };

    let mut animator = Animator::new(journal, max_frame);
    let undo = std::iter::repeat(Action::Undo).take(options.undo);
    animator
        .apply_all(undo)
        .with_context(|| format!("Cannot undo {} action(s)", options.undo))?;
    if let Some(frame) = options.frame {
        animator.apply_action(Action::SetFrame { frame })?;
    }

    println!("{}", "Project".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Directory:     {}", project.root().display().to_string().cyan());
    let attribution = &project.config().attribution;
    if let Some(title) = &attribution.title {
        println!("Title:         {}", title);
    }
    if let Some(author) = &attribution.author {
        println!("Author:        {}", author);
    }
    if let Some(audio) = project.audio_path() {
        println!("Audio:         {}", audio.display().to_string().dimmed());
    }
    let [width, height] = project.config().drawing_size;
    println!("Canvas:        {}x{} @ {} fps", width, height, project.config().framerate);
    println!();

    let journal = animator.journal();
    println!("Actions:       {}", journal.len());
    println!(
        "Anchors:       {} {}",
        journal.anchor_positions().len(),
        format!("{:?}", journal.anchor_positions()).dimmed()
    );
    println!("Loaded in:     {:.1?}", load_time);
    println!();

    println!("{}", "Frames".bold());
    for (index, frame) in &animator.state().frames {
        let marker = if *index == animator.frame() { "▶" } else { " " };
        let thumb_points: usize = frame
            .thumbnail
            .0
            .iter()
            .map(|polygon| polygon.exterior().0.len())
            .sum();
        println!(
            "{} {:>5}  {:>3} polygon(s)  area {:>12.1}  {}",
            marker.green(),
            index,
            frame.merged_polygons.0.len(),
            frame.area(),
            format!("thumbnail {} pts", thumb_points).dimmed()
        );
    }

    let shown = animator.current_frame()?;
    println!();
    println!(
        "Playhead:      frame {} of {} {}",
        animator.frame(),
        animator.max_frame(),
        format!("(showing area {:.1})", shown.area()).dimmed()
    );

    if options.verify {
        let started = Instant::now();
        let full = animator.journal().replay_full();
        if &full == animator.state() {
            println!(
                "{} Cached state matches a full replay ({:.1?})",
                "✓".green(),
                started.elapsed()
            );
        } else {
            anyhow::bail!("Cached state differs from a full replay of the log");
        }
    }

    if options.save {
        project
            .save_journal(animator.journal())
            .context("Failed to save action log")?;
        println!("{} Saved {}", "✓".green(), project.actions_path().display());
    }

    Ok(())
}
