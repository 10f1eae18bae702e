use beadstock::design::BeadId;

/// Events fed into the GUI from outside the GTK main loop (control socket,
/// config watcher).
#[derive(Debug, Clone)]
pub enum AppEvent {
    Save,
    Clear,
    Remove(BeadId),
    Reorder { from: usize, to: usize },
    Rotate(f64),
    ConfigReload,
}
