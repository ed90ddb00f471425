use indicatif::{ProgressBar, ProgressStyle};
use mdprep::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders core progress events as a single stderr spinner: the current
/// (structure, label, stage) as the message, item transitions as printed
/// lines above it.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

struct BarState {
    structure: String,
    item: String,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner()
            .with_style(Self::spinner_style())
            .with_message("Resolving plan...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();
        let state = Mutex::new(BarState {
            structure: String::new(),
            item: String::new(),
        });

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };
            let Ok(mut state) = state.lock() else {
                return;
            };

            match progress {
                Progress::StructureStart { structure_id } => {
                    pb.reset();
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(structure_id.clone());
                    state.structure = structure_id;
                }
                Progress::StructureFinish => {
                    pb.println(format!("  {} done", state.structure));
                }
                Progress::ItemStart {
                    structure_id,
                    label,
                } => {
                    state.item = format!("{structure_id}/{label}");
                    pb.set_message(state.item.clone());
                }
                Progress::StageStart { stage } => {
                    pb.set_message(format!("{} · {stage}", state.item));
                }
                Progress::StageFinish => {
                    pb.tick();
                }
                Progress::ItemFinish => {
                    pb.set_message(state.structure.clone());
                }
                Progress::Message(msg) => {
                    pb.println(format!("  {msg}"));
                }
            }
        })
    }

    pub fn finish(&self) {
        if let Ok(pb) = self.pb.lock() {
            pb.disable_steady_tick();
            pb.finish_and_clear();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_the_current_item_in_the_message() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::StructureStart {
            structure_id: "1ABC".to_string(),
        });
        callback(Progress::ItemStart {
            structure_id: "1ABC".to_string(),
            label: "A10G".to_string(),
        });
        callback(Progress::StageStart {
            stage: "minimization",
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "1ABC/A10G · minimization");
        }

        callback(Progress::ItemFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "1ABC");
        }
        handler.finish();
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        std::thread::spawn(move || {
            callback(Progress::StructureStart {
                structure_id: "2XYZ".to_string(),
            });
            callback(Progress::StructureFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.message(), "2XYZ");
    }
}
