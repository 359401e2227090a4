// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan-session driver.
//
// Owns the device lifecycle for one scan session: resolve a device when
// none is configured, open and configure it, walk the page queue through
// the geometry engine, keep the notebook's page ledger current, and emit
// callback events. The whole path is synchronous and blocking; the only
// suspension points are the hardware calls and the inter-page delay.

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::{Config, NotebookType};
use image::DynamicImage;
use tracing::{debug, info, instrument, warn};

use crate::callback::ScanCallback;
use crate::device::{DeviceError, DeviceHandle, DeviceTransport, OptionValue};
use crate::geometry;
use crate::request::ScanRequest;

/// Phases a scan session moves through. `Failed` is reachable from every
/// non-idle phase, on errors as well as on cooperative cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ResolvingDevice,
    DeviceOpen,
    Scanning,
    Finished,
    Failed,
}

/// A scanner device which can scan notebooks.
///
/// The driver reports every reportable condition through the registered
/// [`ScanCallback`]; with no callback registered, the same conditions are
/// returned as typed errors instead. Nothing is silently swallowed.
pub struct Scanner<T: DeviceTransport> {
    transport: T,
    config: Config,
    callback: Option<Box<dyn ScanCallback>>,
    state: SessionState,
}

impl<T: DeviceTransport> Scanner<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            callback: None,
            state: SessionState::Idle,
        }
    }

    /// Register the event sink for subsequent sessions.
    pub fn register(&mut self, callback: Box<dyn ScanCallback>) {
        self.callback = Some(callback);
    }

    /// The configuration as the session left it. The device chosen through
    /// `on_set_device` ends up in `scanner_device` here, for the caller to
    /// persist.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run one scan session over the request's page queue.
    ///
    /// The device session is released exactly once on every exit path.
    /// Ledger updates and page events already delivered stay applied when
    /// the session aborts partway; partial progress is retained.
    #[instrument(skip_all, fields(notebook = request.notebook().title()))]
    pub fn scan(&mut self, request: &mut ScanRequest) -> Result<()> {
        self.enter(SessionState::ResolvingDevice);

        if self.config.scanner_device.is_empty() {
            if let Err(error) = self.resolve_device() {
                self.enter(SessionState::Failed);
                return Err(error);
            }
            if self.config.scanner_device.is_empty() {
                // Reported through the callback; there is no device to open.
                self.enter(SessionState::Failed);
                return Ok(());
            }
        }

        self.enter(SessionState::DeviceOpen);
        let name = self.config.scanner_device.clone();
        let mut device = match self.transport.open(&name) {
            Ok(device) => device,
            Err(DeviceError::Interrupted) => {
                self.enter(SessionState::Failed);
                return self.report(BlattwerkError::Interrupted(
                    "while opening the device".to_owned(),
                ));
            }
            Err(DeviceError::Backend(reason)) => {
                self.enter(SessionState::Failed);
                return self.report(BlattwerkError::DeviceOpen { name, reason });
            }
        };
        info!(device = device.name(), "device opened");

        let outcome = self.run_queue(&mut device, request);
        // Report before closing, preserving the error-then-release order a
        // caller observes.
        let result = match outcome {
            Ok(()) => {
                self.enter(SessionState::Finished);
                Ok(())
            }
            Err(error) => {
                self.enter(SessionState::Failed);
                self.report(error)
            }
        };
        device.close();
        debug!("device closed");
        result
    }

    fn enter(&mut self, state: SessionState) {
        debug!(from = ?self.state, to = ?state, "session state change");
        self.state = state;
    }

    /// Deliver a reportable condition: through the callback when one is
    /// registered, as a typed error otherwise.
    fn report(&mut self, error: BlattwerkError) -> Result<()> {
        match self.callback.as_mut() {
            Some(callback) => {
                warn!(%error, "scan session error");
                callback.on_error(&error.to_string());
                Ok(())
            }
            None => Err(error),
        }
    }

    /// Resolve a device through enumeration and the callback. On success
    /// the chosen name lands in `config.scanner_device`; on every failure
    /// path the name stays empty and the condition has been reported.
    fn resolve_device(&mut self) -> Result<()> {
        if let Some(callback) = self.callback.as_mut() {
            callback.on_searching_for_devices();
        }

        let devices = match self.transport.enumerate() {
            Ok(devices) => devices,
            Err(DeviceError::Interrupted) => {
                return self.report(BlattwerkError::Interrupted(
                    "while searching for devices".to_owned(),
                ));
            }
            Err(DeviceError::Backend(reason)) => {
                return self.report(BlattwerkError::DeviceList(reason));
            }
        };
        if devices.is_empty() {
            return self.report(BlattwerkError::NoDevicesFound);
        }
        info!(count = devices.len(), "devices enumerated");

        let chosen = match self.callback.as_mut() {
            Some(callback) => callback.on_set_device(&devices),
            // Nobody can choose a device for us.
            None => None,
        };
        match chosen {
            Some(name) if !name.is_empty() => {
                info!(device = %name, "device selected");
                self.config.scanner_device = name;
                Ok(())
            }
            _ => self.report(BlattwerkError::DeviceNotSet),
        }
    }

    /// Apply format, mode, and resolution to the open device. An option is
    /// applied only when the device exposes it and the configured value is
    /// allowed; everything else is reported and the hardware default kept.
    fn configure_device(&mut self, device: &mut T::Handle) -> Result<()> {
        let wanted = [
            ("format", OptionValue::Text("jpeg".to_owned())),
            ("mode", OptionValue::Text(self.config.scanner_mode.clone())),
            (
                "resolution",
                OptionValue::Number(self.config.scanner_resolution),
            ),
        ];

        for (option, value) in wanted {
            if !device.capabilities().has_option(option) {
                self.report(BlattwerkError::OptionNotSupported(option.to_owned()))?;
                continue;
            }
            if !device.capabilities().allows(option, &value) {
                let allowed = device.capabilities().describe_allowed(option);
                self.report(BlattwerkError::OptionValueNotAllowed {
                    option: option.to_owned(),
                    value: value.to_string(),
                    allowed,
                })?;
                continue;
            }
            match device.configure(option, &value) {
                Ok(()) => debug!(option, %value, "option applied"),
                Err(DeviceError::Interrupted) => {
                    return Err(BlattwerkError::Interrupted(
                        "while configuring the device".to_owned(),
                    ));
                }
                Err(DeviceError::Backend(reason)) => {
                    self.report(BlattwerkError::OptionApply {
                        option: option.to_owned(),
                        reason,
                    })?;
                }
            }
        }
        Ok(())
    }

    /// The capture loop. Returns the fatal condition unreported; the caller
    /// reports it and closes the device.
    fn run_queue(&mut self, device: &mut T::Handle, request: &mut ScanRequest) -> Result<()> {
        self.configure_device(device)?;

        if request.is_empty() {
            return Err(BlattwerkError::NothingToScan);
        }

        self.enter(SessionState::Scanning);
        if let Some(callback) = self.callback.as_mut() {
            callback.on_start(device.name(), &request.snapshot());
        }

        let kind = request.notebook().kind().clone();
        let first_page = request.notebook().first_page_number();
        let delay = self.config.delay();

        while let Some(page) = request.pop() {
            if let Some(callback) = self.callback.as_mut() {
                callback.on_start_scan_page(page);
            }
            debug!(page, "capturing");

            let raw = match device.capture() {
                Ok(image) => image,
                Err(DeviceError::Interrupted) => {
                    return Err(BlattwerkError::Interrupted("while scanning".to_owned()));
                }
                Err(DeviceError::Backend(reason)) => {
                    return Err(BlattwerkError::Capture(reason));
                }
            };
            let resolution = device.resolution();

            if geometry::captures_pair(&raw, &kind, resolution)
                && geometry::is_left_page(page, first_page)
            {
                // One physical scan carries the whole spread.
                self.emit_page(page, &raw, &kind, first_page, resolution, request);
                self.emit_page(page + 1, &raw, &kind, first_page, resolution, request);
                if request.peek() == Some(page + 1) {
                    request.pop();
                }
            } else {
                self.emit_page(page, &raw, &kind, first_page, resolution, request);
            }

            if !request.is_empty() && !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }

        if let Some(callback) = self.callback.as_mut() {
            callback.on_finish(request.notebook());
        }
        info!("scan session finished");
        Ok(())
    }

    /// Crop one page out of a raw capture, grow the ledger when the page is
    /// new, and hand the finalized image to the callback.
    fn emit_page(
        &mut self,
        page: u32,
        raw: &DynamicImage,
        kind: &NotebookType,
        first_page: u32,
        resolution: u32,
        request: &mut ScanRequest,
    ) {
        let image = geometry::crop_page(page, raw, kind, first_page, resolution);

        let notebook = request.notebook_mut();
        if i64::from(page) > notebook.last_page_number() {
            notebook.set_total_pages(i64::from(notebook.total_pages()) + 1);
            debug!(page, total_pages = notebook.total_pages(), "page appended");
        }

        if let Some(callback) = self.callback.as_mut() {
            callback.on_finish_scan_page(request.notebook(), page, image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    use blattwerk_core::Notebook;
    use image::RgbImage;

    use crate::device::{DeviceCapabilities, DeviceDescriptor};

    // -- Mock transport -------------------------------------------------------

    #[derive(Default)]
    struct Counters {
        opens: Cell<u32>,
        captures: Cell<u32>,
        closes: Cell<u32>,
    }

    struct MockDevice {
        name: String,
        caps: DeviceCapabilities,
        resolution: u32,
        frames: VecDeque<std::result::Result<DynamicImage, DeviceError>>,
        counters: Rc<Counters>,
    }

    impl DeviceHandle for MockDevice {
        fn name(&self) -> &str {
            &self.name
        }

        fn capabilities(&self) -> &DeviceCapabilities {
            &self.caps
        }

        fn configure(
            &mut self,
            option: &str,
            value: &OptionValue,
        ) -> std::result::Result<(), DeviceError> {
            if option == "resolution" {
                if let OptionValue::Number(resolution) = value {
                    self.resolution = *resolution;
                }
            }
            Ok(())
        }

        fn resolution(&self) -> u32 {
            self.resolution
        }

        fn capture(&mut self) -> std::result::Result<DynamicImage, DeviceError> {
            self.counters.captures.set(self.counters.captures.get() + 1);
            self.frames
                .pop_front()
                .unwrap_or_else(|| Err(DeviceError::Backend("no frames scripted".to_owned())))
        }

        fn close(self) {
            self.counters.closes.set(self.counters.closes.get() + 1);
        }
    }

    struct MockTransport {
        devices: Vec<DeviceDescriptor>,
        caps: DeviceCapabilities,
        frames: RefCell<VecDeque<std::result::Result<DynamicImage, DeviceError>>>,
        enumerate_interrupted: bool,
        open_error: Option<String>,
        counters: Rc<Counters>,
    }

    impl MockTransport {
        fn new(counters: Rc<Counters>) -> Self {
            Self {
                devices: vec![descriptor("mock:0"), descriptor("mock:1")],
                caps: default_caps(),
                frames: RefCell::new(VecDeque::new()),
                enumerate_interrupted: false,
                open_error: None,
                counters,
            }
        }

        fn with_frames(self, frames: Vec<std::result::Result<DynamicImage, DeviceError>>) -> Self {
            *self.frames.borrow_mut() = frames.into();
            self
        }
    }

    impl DeviceTransport for MockTransport {
        type Handle = MockDevice;

        fn enumerate(&self) -> std::result::Result<Vec<DeviceDescriptor>, DeviceError> {
            if self.enumerate_interrupted {
                return Err(DeviceError::Interrupted);
            }
            Ok(self.devices.clone())
        }

        fn open(&self, name: &str) -> std::result::Result<MockDevice, DeviceError> {
            self.counters.opens.set(self.counters.opens.get() + 1);
            if let Some(reason) = &self.open_error {
                return Err(DeviceError::Backend(reason.clone()));
            }
            Ok(MockDevice {
                name: name.to_owned(),
                caps: self.caps.clone(),
                resolution: 150,
                frames: self.frames.take(),
                counters: Rc::clone(&self.counters),
            })
        }
    }

    fn descriptor(name: &str) -> DeviceDescriptor {
        DeviceDescriptor {
            name: name.to_owned(),
            vendor: "Mock".to_owned(),
            model: "Glassbed 9000".to_owned(),
            class: "flatbed scanner".to_owned(),
        }
    }

    fn default_caps() -> DeviceCapabilities {
        DeviceCapabilities::new()
            .with_option(
                "format",
                vec![
                    OptionValue::Text("jpeg".to_owned()),
                    OptionValue::Text("png".to_owned()),
                ],
            )
            .with_option(
                "mode",
                vec![
                    OptionValue::Text("Gray".to_owned()),
                    OptionValue::Text("Color".to_owned()),
                ],
            )
            .with_option(
                "resolution",
                vec![
                    OptionValue::Number(75),
                    OptionValue::Number(150),
                    OptionValue::Number(300),
                ],
            )
    }

    fn frame(width: u32, height: u32) -> std::result::Result<DynamicImage, DeviceError> {
        Ok(DynamicImage::ImageRgb8(RgbImage::new(width, height)))
    }

    /// Full-glass A4 portrait capture at 150 ppi.
    fn a4_frame() -> std::result::Result<DynamicImage, DeviceError> {
        frame(1300, 1772)
    }

    fn a4_notebook() -> Notebook {
        let kind = NotebookType::new("A4", 210, 297);
        Notebook::new("notes", kind, "/tmp/notes.pdf")
    }

    fn paired_notebook() -> Notebook {
        let mut kind = NotebookType::new("pocket", 100, 150);
        kind.set_pages_paired(true);
        Notebook::new("pocket notes", kind, "/tmp/pocket.pdf")
    }

    fn configured() -> Config {
        Config {
            scanner_device: "mock:0".to_owned(),
            ..Config::default()
        }
    }

    // -- Recording callback ---------------------------------------------------

    #[derive(Default)]
    struct Recorded {
        events: Vec<String>,
        finished_pages: Vec<(u32, u32, u32)>,
        errors: Vec<String>,
        start: Option<(String, Vec<u32>)>,
        searching: u32,
        finish_count: u32,
    }

    struct RecordingCallback {
        recorded: Rc<RefCell<Recorded>>,
        choose: Option<String>,
    }

    impl RecordingCallback {
        fn new(recorded: Rc<RefCell<Recorded>>) -> Self {
            Self {
                recorded,
                choose: None,
            }
        }

        fn choosing(recorded: Rc<RefCell<Recorded>>, name: &str) -> Self {
            Self {
                recorded,
                choose: Some(name.to_owned()),
            }
        }
    }

    impl ScanCallback for RecordingCallback {
        fn on_searching_for_devices(&mut self) {
            let mut recorded = self.recorded.borrow_mut();
            recorded.searching += 1;
            recorded.events.push("searching".to_owned());
        }

        fn on_set_device(&mut self, devices: &[DeviceDescriptor]) -> Option<String> {
            assert!(!devices.is_empty());
            self.recorded.borrow_mut().events.push("set_device".to_owned());
            self.choose.clone()
        }

        fn on_start(&mut self, device_name: &str, pages_queue: &[u32]) {
            let mut recorded = self.recorded.borrow_mut();
            recorded.start = Some((device_name.to_owned(), pages_queue.to_vec()));
            recorded.events.push("start".to_owned());
        }

        fn on_start_scan_page(&mut self, page: u32) {
            self.recorded
                .borrow_mut()
                .events
                .push(format!("start_page {page}"));
        }

        fn on_finish_scan_page(&mut self, notebook: &Notebook, page: u32, image: DynamicImage) {
            // The ledger must already satisfy the session invariant when the
            // page event is delivered.
            assert!(
                i64::from(notebook.total_pages())
                    >= i64::from(page) - i64::from(notebook.first_page_number()) + 1
            );
            let mut recorded = self.recorded.borrow_mut();
            recorded
                .finished_pages
                .push((page, image.width(), image.height()));
            recorded.events.push(format!("finish_page {page}"));
        }

        fn on_finish(&mut self, _notebook: &Notebook) {
            let mut recorded = self.recorded.borrow_mut();
            recorded.finish_count += 1;
            recorded.events.push("finish".to_owned());
        }

        fn on_error(&mut self, message: &str) {
            let mut recorded = self.recorded.borrow_mut();
            recorded.errors.push(message.to_owned());
            recorded.events.push(format!("error {message}"));
        }
    }

    fn recording_scanner(
        transport: MockTransport,
        config: Config,
    ) -> (Scanner<MockTransport>, Rc<RefCell<Recorded>>) {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut scanner = Scanner::new(transport, config);
        scanner.register(Box::new(RecordingCallback::new(Rc::clone(&recorded))));
        (scanner, recorded)
    }

    // -- Session scenarios ----------------------------------------------------

    /// Three appended pages: ledger grows to 3, page events arrive in queue
    /// order, the session finishes once, the device closes once.
    #[test]
    fn scan_captures_all_queued_pages() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters)).with_frames(vec![
            a4_frame(),
            a4_frame(),
            a4_frame(),
        ]);
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        request.enqueue(2);
        request.enqueue(3);

        scanner.scan(&mut request).expect("scan");

        let recorded = recorded.borrow();
        assert!(recorded.errors.is_empty(), "{:?}", recorded.errors);
        assert_eq!(request.notebook().total_pages(), 3);
        assert_eq!(
            recorded
                .finished_pages
                .iter()
                .map(|(page, _, _)| *page)
                .collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        // Every page was cropped to the declared A4 size.
        for (_, width, height) in &recorded.finished_pages {
            assert_eq!((*width, *height), (1241, 1754));
        }
        assert_eq!(recorded.finish_count, 1);
        assert_eq!(recorded.start.as_ref().unwrap().0, "mock:0");
        assert_eq!(recorded.start.as_ref().unwrap().1, vec![1, 2, 3]);
        assert_eq!(counters.captures.get(), 3);
        assert_eq!(counters.closes.get(), 1);
        assert_eq!(scanner.state(), SessionState::Finished);
    }

    /// `on_finish_scan_page` for page N is delivered before the capture of
    /// page N+1 begins.
    #[test]
    fn page_events_are_strictly_ordered() {
        let counters = Rc::new(Counters::default());
        let transport =
            MockTransport::new(Rc::clone(&counters)).with_frames(vec![a4_frame(), a4_frame()]);
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        request.enqueue(2);

        scanner.scan(&mut request).expect("scan");

        assert_eq!(
            recorded.borrow().events,
            vec![
                "start",
                "start_page 1",
                "finish_page 1",
                "start_page 2",
                "finish_page 2",
                "finish",
            ]
        );
    }

    /// Re-scanning an existing page replaces it without growing the ledger.
    #[test]
    fn replacing_an_existing_page_keeps_the_total() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters)).with_frames(vec![a4_frame()]);
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut notebook = a4_notebook();
        notebook.set_total_pages(3);
        let mut request = ScanRequest::new(notebook);
        request.enqueue(2);

        scanner.scan(&mut request).expect("scan");

        assert_eq!(request.notebook().total_pages(), 3);
        assert_eq!(recorded.borrow().finished_pages.len(), 1);
    }

    /// A paired spread satisfies the next queued page without a second
    /// physical capture.
    #[test]
    fn paired_capture_satisfies_next_queued_page() {
        let counters = Rc::new(Counters::default());
        // Portrait glass wide enough for two 100 mm pages.
        let transport = MockTransport::new(Rc::clone(&counters)).with_frames(vec![frame(1241, 1754)]);
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut request = ScanRequest::new(paired_notebook());
        request.enqueue(1);
        request.enqueue(2);

        scanner.scan(&mut request).expect("scan");

        let recorded = recorded.borrow();
        assert!(recorded.errors.is_empty(), "{:?}", recorded.errors);
        assert_eq!(counters.captures.get(), 1);
        assert_eq!(request.notebook().total_pages(), 2);
        assert_eq!(
            recorded
                .finished_pages
                .iter()
                .map(|(page, width, height)| (*page, *width, *height))
                .collect::<Vec<_>>(),
            vec![(1, 591, 886), (2, 591, 886)]
        );
        assert_eq!(recorded.finish_count, 1);
    }

    /// A right-hand member popped on its own is cropped from its side of
    /// the spread; the queue is not skipped ahead.
    #[test]
    fn lone_right_page_needs_its_own_capture() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters)).with_frames(vec![frame(1241, 1754)]);
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut notebook = paired_notebook();
        notebook.set_total_pages(2);
        let mut request = ScanRequest::new(notebook);
        request.enqueue(2); // right member: first page 1, page 2

        scanner.scan(&mut request).expect("scan");

        let recorded = recorded.borrow();
        assert_eq!(counters.captures.get(), 1);
        assert_eq!(recorded.finished_pages, vec![(2, 591, 886)]);
        assert_eq!(request.notebook().total_pages(), 2);
    }

    /// When the paired successor is not the next queued number, nothing
    /// extra is popped; the following left member gets its own capture.
    #[test]
    fn paired_capture_only_skips_the_immediate_successor() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters))
            .with_frames(vec![frame(1241, 1754), frame(1241, 1754)]);
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut request = ScanRequest::new(paired_notebook());
        request.enqueue(1);
        request.enqueue(3); // page 2 comes out of the first capture anyway

        scanner.scan(&mut request).expect("scan");

        let recorded = recorded.borrow();
        assert_eq!(counters.captures.get(), 2);
        assert_eq!(
            recorded
                .finished_pages
                .iter()
                .map(|(page, _, _)| *page)
                .collect::<Vec<_>>(),
            // Both captures hold a full spread, so each left member brings
            // its right-hand partner along.
            vec![1, 2, 3, 4]
        );
        assert_eq!(request.notebook().total_pages(), 4);
    }

    /// Interrupt during the second of three captures: partial progress is
    /// retained, `on_finish` never fires, the device still closes once.
    #[test]
    fn interrupt_mid_session_retains_partial_progress() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters))
            .with_frames(vec![a4_frame(), Err(DeviceError::Interrupted)]);
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        request.enqueue(2);
        request.enqueue(3);

        scanner.scan(&mut request).expect("reported via callback");

        let recorded = recorded.borrow();
        assert_eq!(counters.closes.get(), 1);
        assert_eq!(recorded.finish_count, 0);
        assert_eq!(request.notebook().total_pages(), 1);
        assert_eq!(recorded.errors, vec!["interrupted while scanning"]);
        assert_eq!(scanner.state(), SessionState::Failed);
    }

    /// A hardware capture failure aborts like an interrupt, with its own
    /// message.
    #[test]
    fn capture_failure_reports_and_closes() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters))
            .with_frames(vec![Err(DeviceError::Backend("lamp failure".to_owned()))]);
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);

        scanner.scan(&mut request).expect("reported via callback");

        let recorded = recorded.borrow();
        assert_eq!(counters.closes.get(), 1);
        assert_eq!(recorded.finish_count, 0);
        assert_eq!(recorded.errors, vec!["capture failed: lamp failure"]);
    }

    /// An empty queue is reported and nothing is captured; the device that
    /// was already open is still closed.
    #[test]
    fn empty_queue_reports_nothing_to_scan() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters));
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut request = ScanRequest::new(a4_notebook());
        scanner.scan(&mut request).expect("reported via callback");

        let recorded = recorded.borrow();
        assert_eq!(recorded.errors, vec!["Nothing to scan"]);
        assert!(recorded.start.is_none());
        assert_eq!(recorded.finish_count, 0);
        assert_eq!(counters.captures.get(), 0);
        assert_eq!(counters.closes.get(), 1);
    }

    // -- Device resolution ----------------------------------------------------

    /// With no configured device the callback picks one from the
    /// enumeration, and the choice sticks in the session config.
    #[test]
    fn callback_chooses_a_device() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters)).with_frames(vec![a4_frame()]);
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut scanner = Scanner::new(transport, Config::default());
        scanner.register(Box::new(RecordingCallback::choosing(
            Rc::clone(&recorded),
            "mock:1",
        )));

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        scanner.scan(&mut request).expect("scan");

        let recorded = recorded.borrow();
        assert_eq!(recorded.searching, 1);
        assert_eq!(scanner.config().scanner_device, "mock:1");
        assert_eq!(recorded.start.as_ref().unwrap().0, "mock:1");
        assert_eq!(recorded.finish_count, 1);
    }

    /// An empty enumeration is reported and no device is ever opened.
    #[test]
    fn no_devices_found_never_opens() {
        let counters = Rc::new(Counters::default());
        let mut transport = MockTransport::new(Rc::clone(&counters));
        transport.devices.clear();
        let (mut scanner, recorded) = recording_scanner(transport, Config::default());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        scanner.scan(&mut request).expect("reported via callback");

        assert_eq!(recorded.borrow().errors, vec!["No devices found"]);
        assert_eq!(counters.opens.get(), 0);
        assert_eq!(counters.closes.get(), 0);
        assert_eq!(scanner.state(), SessionState::Failed);
    }

    /// Declining the device selection aborts before anything is opened.
    #[test]
    fn declined_selection_reports_device_not_set() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters));
        let (mut scanner, recorded) = recording_scanner(transport, Config::default());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        scanner.scan(&mut request).expect("reported via callback");

        assert_eq!(recorded.borrow().errors, vec!["Device is not set"]);
        assert_eq!(counters.opens.get(), 0);
    }

    /// An interrupted enumeration is reported with its own message.
    #[test]
    fn interrupted_enumeration_is_reported() {
        let counters = Rc::new(Counters::default());
        let mut transport = MockTransport::new(Rc::clone(&counters));
        transport.enumerate_interrupted = true;
        let (mut scanner, recorded) = recording_scanner(transport, Config::default());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        scanner.scan(&mut request).expect("reported via callback");

        assert_eq!(
            recorded.borrow().errors,
            vec!["interrupted while searching for devices"]
        );
        assert_eq!(counters.opens.get(), 0);
    }

    /// A rejected device name is fatal and reported.
    #[test]
    fn open_failure_is_fatal() {
        let counters = Rc::new(Counters::default());
        let mut transport = MockTransport::new(Rc::clone(&counters));
        transport.open_error = Some("device busy".to_owned());
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        scanner.scan(&mut request).expect("reported via callback");

        let recorded = recorded.borrow();
        assert_eq!(
            recorded.errors,
            vec!["failed to open device 'mock:0': device busy"]
        );
        assert_eq!(recorded.finish_count, 0);
        assert_eq!(counters.closes.get(), 0);
    }

    // -- Option negotiation ---------------------------------------------------

    /// A configured value outside the allowed set is reported and the scan
    /// continues on the hardware default.
    #[test]
    fn disallowed_option_value_is_nonfatal() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters)).with_frames(vec![a4_frame()]);
        let config = Config {
            scanner_device: "mock:0".to_owned(),
            scanner_mode: "Lineart".to_owned(),
            ..Config::default()
        };
        let (mut scanner, recorded) = recording_scanner(transport, config);

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        scanner.scan(&mut request).expect("scan");

        let recorded = recorded.borrow();
        assert_eq!(recorded.errors.len(), 1);
        assert!(
            recorded.errors[0].contains("wrong value 'Lineart' for scanner option 'mode'"),
            "{:?}",
            recorded.errors
        );
        assert!(recorded.errors[0].contains("Gray, Color"));
        // The session still ran to completion.
        assert_eq!(recorded.finish_count, 1);
        assert_eq!(request.notebook().total_pages(), 1);
    }

    /// An option the device does not expose at all is reported the same
    /// non-fatal way.
    #[test]
    fn missing_option_is_nonfatal() {
        let counters = Rc::new(Counters::default());
        let mut transport = MockTransport::new(Rc::clone(&counters)).with_frames(vec![a4_frame()]);
        transport.caps = DeviceCapabilities::new()
            .with_option(
                "mode",
                vec![OptionValue::Text("Gray".to_owned())],
            )
            .with_option("resolution", vec![OptionValue::Number(150)]);
        let (mut scanner, recorded) = recording_scanner(transport, configured());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        scanner.scan(&mut request).expect("scan");

        let recorded = recorded.borrow();
        assert_eq!(
            recorded.errors,
            vec!["scanner option 'format' cannot be set"]
        );
        assert_eq!(recorded.finish_count, 1);
    }

    // -- No-callback semantics ------------------------------------------------

    /// Without a callback, reportable conditions surface as typed errors.
    #[test]
    fn no_callback_returns_typed_errors() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters));
        let mut scanner = Scanner::new(transport, configured());

        let mut request = ScanRequest::new(a4_notebook());
        let result = scanner.scan(&mut request);
        assert!(matches!(result, Err(BlattwerkError::NothingToScan)));
        // The device was opened before the queue check and must be closed.
        assert_eq!(counters.closes.get(), 1);
    }

    #[test]
    fn no_callback_and_no_device_cannot_resolve() {
        let counters = Rc::new(Counters::default());
        let transport = MockTransport::new(Rc::clone(&counters));
        let mut scanner = Scanner::new(transport, Config::default());

        let mut request = ScanRequest::new(a4_notebook());
        request.enqueue(1);
        let result = scanner.scan(&mut request);
        assert!(matches!(result, Err(BlattwerkError::DeviceNotSet)));
        assert_eq!(counters.opens.get(), 0);
    }
}
