use std::io;

use anyhow::Context;
use driftfield_client::{
    particles_js_with, Document, FieldHandle, Presenter, RunOptions, TerminalPresenter,
    TerminalSize, Viewport, WindowChanges,
};
use driftfield_utils::cli::CliArgs;
use driftfield_utils::consts::DEFAULT_CONTAINER_ID;
use driftfield_utils::logging::configure_logger;
use log::{debug, info};
use tokio::sync::mpsc;

/// Run the particle field in the terminal until interrupted (or until the
/// frame limit is reached)
pub(crate) async fn start_field(opts: CliArgs) -> anyhow::Result<()> {
    let log_file = configure_logger(&opts.log_level)?;
    info!("Starting driftfield, logging to {}", log_file.display());

    let size = TerminalSize::query();
    let mut document = Document::new(size.viewport()).with_container(DEFAULT_CONTAINER_ID);
    let resizes = forward_window_changes()?;
    let presenter = TerminalPresenter::new(io::stdout());

    if let Some(frames) =
        run_field(&opts, &mut document, size.cell_size(), presenter, resizes).await?
    {
        info!("Rendered {} frames", frames);
    }
    Ok(())
}

/// Mount the field described by `opts` into `document` and drive it until it
/// stops. Returns `None` without drawing when the container does not exist.
pub(crate) async fn run_field<P>(
    opts: &CliArgs,
    document: &mut Document,
    (cell_width, cell_height): (f64, f64),
    presenter: P,
    resizes: mpsc::Receiver<Viewport>,
) -> anyhow::Result<Option<u64>>
where
    P: Presenter + 'static,
{
    let config = opts
        .field_config()
        .context("failed to load particle configuration")?;
    let options = RunOptions {
        fps: opts.fps,
        seed: opts.seed,
        max_frames: opts.frames,
        cell_width,
        cell_height,
    };

    let Some(handle) = particles_js_with(document, &opts.container, &config, &options, presenter)
    else {
        return Ok(None);
    };

    drive(document, handle, resizes).await.map(Some)
}

/// Terminal viewports, one per SIGWINCH
fn forward_window_changes() -> anyhow::Result<mpsc::Receiver<Viewport>> {
    let mut window_changes =
        WindowChanges::new().context("failed to listen for terminal resizes")?;
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        while window_changes.recv().await.is_some() {
            let size = TerminalSize::query();
            debug!("Terminal resized to {}x{} cells", size.columns, size.rows);
            if tx.send(size.viewport()).await.is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

/// Forward resizes and Ctrl-C to the running field
async fn drive(
    document: &Document,
    handle: FieldHandle,
    mut resizes: mpsc::Receiver<Viewport>,
) -> anyhow::Result<u64> {
    let cancel = handle.cancellation_token();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
            Some(viewport) = resizes.recv() => document.resize(viewport),
        }
    }

    handle.stop().await.context("particle field failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use driftfield_client::Node;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    const CURSOR_HOME: &str = "\x1b[H";
    const LEAVE_SCREEN: &str = "\x1b[0m\x1b[?25h\x1b[?1049l";

    /// Terminal output the test can read after the presenter moves away
    #[derive(Clone, Default)]
    struct SharedScreen(Arc<Mutex<Vec<u8>>>);

    impl SharedScreen {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedScreen {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn terminal_document() -> Document {
        let mut document =
            Document::new(Viewport::new(160.0, 64.0)).with_container(DEFAULT_CONTAINER_ID);
        document.append_text(DEFAULT_CONTAINER_ID, "previous content");
        document
    }

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["driftfield", "--seed", "9"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_container_exits_without_drawing() {
        let mut document = terminal_document();
        let screen = SharedScreen::default();
        let (_tx, rx) = mpsc::channel(1);

        let frames = run_field(
            &args(&["--container", "nope", "--frames", "3"]),
            &mut document,
            (8.0, 16.0),
            TerminalPresenter::new(screen.clone()),
            rx,
        )
        .await
        .unwrap();

        assert_eq!(frames, None);
        assert!(screen.text().is_empty());
        assert_eq!(
            document.children(DEFAULT_CONTAINER_ID),
            Some(&[Node::Text("previous content".to_string())][..])
        );
        assert_eq!(document.resize_listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn frame_limit_draws_and_restores_the_screen() {
        let mut document = terminal_document();
        let screen = SharedScreen::default();
        let (_tx, rx) = mpsc::channel(1);

        let frames = run_field(
            &args(&["--frames", "3", "--count", "5"]),
            &mut document,
            (8.0, 16.0),
            TerminalPresenter::new(screen.clone()).monochrome(),
            rx,
        )
        .await
        .unwrap();

        assert_eq!(frames, Some(3));
        let text = screen.text();
        assert_eq!(text.matches(CURSOR_HOME).count(), 3);
        assert!(text.ends_with(LEAVE_SCREEN));
        assert_eq!(document.resize_listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn resizes_reach_the_running_field() {
        let mut document = terminal_document();
        let screen = SharedScreen::default();
        let (tx, rx) = mpsc::channel(1);
        tx.send(Viewport::new(80.0, 32.0)).await.unwrap();

        let frames = run_field(
            &args(&["--frames", "2"]),
            &mut document,
            (8.0, 16.0),
            TerminalPresenter::new(screen.clone()).monochrome(),
            rx,
        )
        .await
        .unwrap();

        assert_eq!(frames, Some(2));
        assert_eq!(document.viewport(), Viewport::new(80.0, 32.0));

        let text = screen.text();
        let last_frame = text
            .rsplit(CURSOR_HOME)
            .next()
            .and_then(|frame| frame.strip_suffix(LEAVE_SCREEN))
            .unwrap();
        let rows: Vec<&str> = last_frame.split("\r\n").collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.chars().count() == 10));
    }
}
