// End-to-end watch workflow with in-memory frontend, host and clipboard
// Real directories, real archiver; only the user and the network are faked

use chrono::Local;
use paxss::core::archiver::archive_target;
use paxss::core::decision::{await_decision, Clock, PromptInput, PromptInputs};
use paxss::core::{
    Decision, DecisionPrompt, ImageHost, Notifier, Orchestrator, ProcessingState, Uploader,
};
use paxss::platform::Clipboard;
use paxss::{Config, PaxError, Result};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const URL: &str = "https://i.imgur.com/shot1.png";

#[derive(Clone, Default)]
struct Calls(Rc<RefCell<Vec<PathBuf>>>);

struct CountingHost {
    calls: Calls,
    fail: bool,
}

impl ImageHost for CountingHost {
    fn upload(&self, file: &Path) -> Result<String> {
        self.calls.0.borrow_mut().push(file.to_path_buf());
        if self.fail {
            Err(PaxError::upload("image host returned status 500"))
        } else {
            Ok(URL.to_string())
        }
    }
}

#[derive(Clone)]
struct RecordingClipboard(Rc<RefCell<String>>);

impl Clipboard for RecordingClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        *self.0.borrow_mut() = text.to_string();
        Ok(())
    }
}

/// Answers from a queue and runs the action before returning, like the
/// terminal prompt does.
struct ScriptedPrompt {
    answers: VecDeque<Result<Decision>>,
    prompted: Rc<RefCell<Vec<PathBuf>>>,
    confirmations: Rc<RefCell<Vec<String>>>,
    stop_after_idles: Option<(Rc<AtomicBool>, usize)>,
    idles: usize,
}

impl ScriptedPrompt {
    fn new(answers: Vec<Result<Decision>>) -> Self {
        Self {
            answers: answers.into(),
            prompted: Rc::default(),
            confirmations: Rc::default(),
            stop_after_idles: None,
            idles: 0,
        }
    }
}

impl DecisionPrompt for ScriptedPrompt {
    fn prompt(&mut self, file: &Path, act: &mut dyn FnMut(Decision)) -> Result<Decision> {
        self.prompted.borrow_mut().push(file.to_path_buf());
        if !file.exists() {
            return Err(PaxError::transient_file(file));
        }
        let decision = self.answers.pop_front().unwrap_or(Ok(Decision::DEFAULT))?;
        act(decision);
        Ok(decision)
    }
}

impl Notifier for ScriptedPrompt {
    fn confirm_upload(&mut self, url: &str) {
        self.confirmations.borrow_mut().push(url.to_string());
    }

    fn idle(&mut self, _wait: Duration) -> Result<()> {
        self.idles += 1;
        if let Some((flag, limit)) = &self.stop_after_idles {
            if self.idles >= *limit {
                flag.store(true, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

struct Fixture {
    watch: TempDir,
    upload: TempDir,
    save: TempDir,
    calls: Calls,
    clipboard: Rc<RefCell<String>>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            watch: TempDir::new().unwrap(),
            upload: TempDir::new().unwrap(),
            save: TempDir::new().unwrap(),
            calls: Calls::default(),
            clipboard: Rc::new(RefCell::new("before".to_string())),
        }
    }

    fn config(&self) -> Config {
        Config::new(
            self.watch.path(),
            self.upload.path(),
            self.save.path(),
            "client",
        )
    }

    fn drop_file(&self, name: &str) -> PathBuf {
        let path = self.watch.path().join(name);
        fs::write(&path, b"\x89PNG").unwrap();
        path
    }

    fn orchestrator<F: DecisionPrompt + Notifier>(&self, frontend: F, fail: bool) -> Orchestrator<F> {
        let host = CountingHost {
            calls: self.calls.clone(),
            fail,
        };
        let uploader = Uploader::new(
            Box::new(host),
            Box::new(RecordingClipboard(self.clipboard.clone())),
        );
        Orchestrator::new(&self.config(), frontend, uploader)
    }

    fn dated(&self, root: &Path, name: &str) -> PathBuf {
        archive_target(root, Local::now().date_naive()).join(name)
    }
}

#[test]
fn test_upload_and_archive_happy_path() {
    let fx = Fixture::new();
    fx.drop_file("shot1.png");
    fx.drop_file(".DS_Store");

    let prompt = ScriptedPrompt::new(vec![Ok(Decision::UploadAndArchive)]);
    let prompted = prompt.prompted.clone();
    let confirmations = prompt.confirmations.clone();
    let mut orch = fx.orchestrator(prompt, false);

    let outcomes = orch.run_cycle().unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(prompted.borrow().len(), 1, ".DS_Store must never be offered");
    assert_eq!(fx.calls.0.borrow().len(), 1);
    assert_eq!(*fx.clipboard.borrow(), URL);
    assert!(fx.dated(fx.upload.path(), "shot1.png").exists());
    assert!(!fx.watch.path().join("shot1.png").exists());
    assert!(fx.watch.path().join(".DS_Store").exists());
    assert_eq!(*confirmations.borrow(), vec![URL.to_string()]);
    assert_eq!(orch.state(), ProcessingState::Idle);

    // Nothing left to offer on the next scan
    assert!(orch.run_cycle().unwrap().is_empty());
    assert_eq!(prompted.borrow().len(), 1);
}

#[test]
fn test_archive_only_never_contacts_host() {
    let fx = Fixture::new();
    fx.drop_file("shot1.png");

    let prompt = ScriptedPrompt::new(vec![Ok(Decision::ArchiveOnly)]);
    let confirmations = prompt.confirmations.clone();
    let mut orch = fx.orchestrator(prompt, false);

    orch.run_cycle().unwrap();

    assert!(fx.calls.0.borrow().is_empty());
    assert_eq!(*fx.clipboard.borrow(), "before");
    assert!(fx.dated(fx.save.path(), "shot1.png").exists());
    assert!(confirmations.borrow().is_empty());
}

#[test]
fn test_failed_upload_still_files_under_upload_root() {
    let fx = Fixture::new();
    fx.drop_file("shot1.png");

    let prompt = ScriptedPrompt::new(vec![Ok(Decision::UploadAndArchive)]);
    let confirmations = prompt.confirmations.clone();
    let mut orch = fx.orchestrator(prompt, true);

    let outcome = orch.run_cycle().unwrap().remove(0);

    assert!(outcome.url.is_none());
    assert_eq!(fx.calls.0.borrow().len(), 1);
    assert_eq!(*fx.clipboard.borrow(), "before");
    assert!(fx.dated(fx.upload.path(), "shot1.png").exists());
    assert!(confirmations.borrow().is_empty());
}

#[test]
fn test_vanished_file_is_skipped_and_loop_continues() {
    let fx = Fixture::new();
    let gone = fx.drop_file("a.png");
    fx.drop_file("b.png");
    fs::remove_file(&gone).unwrap();

    let mut orch = fx.orchestrator(ScriptedPrompt::new(vec![Ok(Decision::ArchiveOnly)]), false);

    let outcome = orch.process_file(&gone).unwrap();
    assert_eq!(outcome.decision, None);

    let outcomes = orch.run_cycle().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(fx.dated(fx.save.path(), "b.png").exists());
}

#[test]
fn test_collision_keeps_source_and_moves_on() {
    let fx = Fixture::new();
    let existing = fx.dated(fx.save.path(), "a.png");
    fs::create_dir_all(existing.parent().unwrap()).unwrap();
    fs::write(&existing, b"older").unwrap();
    fx.drop_file("a.png");
    fx.drop_file("b.png");

    let mut orch = fx.orchestrator(
        ScriptedPrompt::new(vec![Ok(Decision::ArchiveOnly), Ok(Decision::ArchiveOnly)]),
        false,
    );

    let outcomes = orch.run_cycle().unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].archived_to.is_none());
    assert_eq!(fs::read(&existing).unwrap(), b"older");
    assert!(fx.watch.path().join("a.png").exists());
    assert!(fx.dated(fx.save.path(), "b.png").exists());
    assert_eq!(orch.state(), ProcessingState::Idle);
}

#[test]
fn test_collision_under_upload_root_never_uploads() {
    let fx = Fixture::new();
    let existing = fx.dated(fx.upload.path(), "shot1.png");
    fs::create_dir_all(existing.parent().unwrap()).unwrap();
    fs::write(&existing, b"older").unwrap();
    fx.drop_file("shot1.png");

    let prompt = ScriptedPrompt::new((0..3).map(|_| Ok(Decision::UploadAndArchive)).collect());
    let prompted = prompt.prompted.clone();
    let confirmations = prompt.confirmations.clone();
    let mut orch = fx.orchestrator(prompt, false);

    for _ in 0..3 {
        orch.run_cycle().unwrap();
    }

    assert_eq!(prompted.borrow().len(), 3);
    assert!(fx.calls.0.borrow().is_empty());
    assert_eq!(*fx.clipboard.borrow(), "before");
    assert!(confirmations.borrow().is_empty());
    assert!(fx.watch.path().join("shot1.png").exists());
    assert_eq!(fs::read(&existing).unwrap(), b"older");
}

#[test]
fn test_interrupt_stops_cycle_without_moving() {
    let fx = Fixture::new();
    fx.drop_file("a.png");

    let mut orch = fx.orchestrator(ScriptedPrompt::new(vec![Err(PaxError::Interrupted)]), false);

    assert!(matches!(orch.run_cycle(), Err(PaxError::Interrupted)));
    assert!(fx.watch.path().join("a.png").exists());
}

#[test]
fn test_run_returns_when_shutdown_is_raised() {
    let fx = Fixture::new();
    fx.drop_file("shot1.png");

    let shutdown = Rc::new(AtomicBool::new(false));
    let mut prompt = ScriptedPrompt::new(vec![Ok(Decision::ArchiveOnly)]);
    prompt.stop_after_idles = Some((shutdown.clone(), 3));
    let prompted = prompt.prompted.clone();

    let mut config = fx.config();
    config.poll_interval = Duration::from_millis(1);
    let uploader = Uploader::new(
        Box::new(CountingHost {
            calls: fx.calls.clone(),
            fail: false,
        }),
        Box::new(RecordingClipboard(fx.clipboard.clone())),
    );
    let mut orch = Orchestrator::new(&config, prompt, uploader);

    orch.run(&shutdown).unwrap();

    assert_eq!(prompted.borrow().len(), 1);
    assert!(fx.dated(fx.save.path(), "shot1.png").exists());
}

#[derive(Clone)]
struct StepClock(Rc<Cell<Instant>>);

impl Clock for StepClock {
    fn now(&self) -> Instant {
        self.0.get()
    }
}

/// Advances the clock by each wait and answers once a scripted time is reached.
struct TimedInputs {
    clock: StepClock,
    start: Instant,
    answer_at: Option<(Duration, PromptInput)>,
}

impl PromptInputs for TimedInputs {
    fn next_input(&mut self, timeout: Duration) -> Result<Option<PromptInput>> {
        let now = self.clock.now();
        if let Some((at, input)) = self.answer_at {
            let elapsed = now - self.start;
            if elapsed + timeout >= at {
                self.clock.0.set(self.start + at);
                self.answer_at = None;
                return Ok(Some(input));
            }
        }
        self.clock.0.set(now + timeout);
        Ok(None)
    }
}

/// A prompt that waits through the real countdown logic.
struct CountdownPrompt {
    timeout: Duration,
    answer_at: Option<(Duration, PromptInput)>,
    elapsed: Rc<Cell<Duration>>,
}

impl DecisionPrompt for CountdownPrompt {
    fn prompt(&mut self, _file: &Path, act: &mut dyn FnMut(Decision)) -> Result<Decision> {
        let start = Instant::now();
        let clock = StepClock(Rc::new(Cell::new(start)));
        let mut inputs = TimedInputs {
            clock: clock.clone(),
            start,
            answer_at: self.answer_at.take(),
        };
        let decision = await_decision(&mut inputs, &clock, self.timeout, |_| Ok(()))?;
        self.elapsed.set(clock.now() - start);
        act(decision);
        Ok(decision)
    }
}

impl Notifier for CountdownPrompt {
    fn confirm_upload(&mut self, _url: &str) {}

    fn idle(&mut self, _wait: Duration) -> Result<()> {
        Ok(())
    }
}

#[test]
fn test_yes_after_two_seconds_uploads_before_timeout() {
    let fx = Fixture::new();
    fx.drop_file("shot1.png");

    let elapsed = Rc::new(Cell::new(Duration::ZERO));
    let prompt = CountdownPrompt {
        timeout: Duration::from_secs(10),
        answer_at: Some((Duration::from_secs(2), PromptInput::Accept)),
        elapsed: elapsed.clone(),
    };
    let mut orch = fx.orchestrator(prompt, false);

    let outcome = orch.run_cycle().unwrap().remove(0);

    assert_eq!(outcome.decision, Some(Decision::UploadAndArchive));
    assert_eq!(elapsed.get(), Duration::from_secs(2));
    assert_eq!(*fx.clipboard.borrow(), URL);
    assert!(fx.dated(fx.upload.path(), "shot1.png").exists());
}

#[test]
fn test_unanswered_prompt_keeps_file_local() {
    let fx = Fixture::new();
    fx.drop_file("shot1.png");

    let elapsed = Rc::new(Cell::new(Duration::ZERO));
    let prompt = CountdownPrompt {
        timeout: Duration::from_secs(10),
        answer_at: None,
        elapsed: elapsed.clone(),
    };
    let mut orch = fx.orchestrator(prompt, false);

    let outcome = orch.run_cycle().unwrap().remove(0);

    assert_eq!(outcome.decision, Some(Decision::ArchiveOnly));
    assert!(elapsed.get() >= Duration::from_secs(10));
    assert!(fx.calls.0.borrow().is_empty());
    assert!(fx.dated(fx.save.path(), "shot1.png").exists());
}
