//! Terminal rendering for workwheel reports.
//!
//! Extension traits that add colored output to workwheel-core types using
//! owo_colors.

use owo_colors::OwoColorize;
use workwheel_core::{
    ActuatorState, ClassificationResult, MoveAction, MoveReport, Status, TickError, TickReport,
};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Status {
    fn render(&self) -> String {
        let label = self.label();
        match self {
            Status::OutOfOffice => label.red().to_string(),
            Status::InMeeting => label.yellow().to_string(),
            Status::FocusTime => label.magenta().to_string(),
            Status::GoingToEvent => label.cyan().to_string(),
            Status::WorkingFromHome => label.blue().to_string(),
            Status::Available => label.green().to_string(),
        }
    }
}

impl Render for ClassificationResult {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} {}",
            self.status.render(),
            format!("(position {})", self.position).dimmed()
        )];

        if let Some(source) = &self.source {
            lines.push(format!(
                "   {} {}",
                source.summary,
                format!("{} → {}", source.start, source.end).dimmed()
            ));
        }

        lines.join("\n")
    }
}

impl Render for MoveReport {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        if self.calibrated {
            lines.push(format!("   {}", "Calibrated with one full revolution".dimmed()));
        }

        lines.push(match self.action {
            MoveAction::None => format!("   Already at position {}", self.position)
                .dimmed()
                .to_string(),
            MoveAction::Moved => format!(
                "   {} {} → {} {}",
                "Moved".green(),
                self.previous_position,
                self.position,
                format!("({:+.3} rev)", self.revolutions).dimmed()
            ),
        });

        lines.join("\n")
    }
}

impl Render for TickReport {
    fn render(&self) -> String {
        format!("{}\n{}", self.classification.render(), self.movement.render())
    }
}

impl Render for ActuatorState {
    fn render(&self) -> String {
        let position = format!(
            "Position {} ({})",
            self.current_position,
            self.current_position.status().render()
        );

        if self.needs_calibration {
            format!("{}\n   {}", position, "Calibration pending".yellow())
        } else {
            position
        }
    }
}

impl Render for TickError {
    fn render(&self) -> String {
        format!(
            "{}\n   {}",
            self.kind.to_string().red(),
            format!("Wheel still at position {}", self.state.current_position).dimmed()
        )
    }
}
