//! bloom - TUI and CLI for phyllotaxis bloom generation
//!
//! Usage:
//!   bloom [--config <yaml>]          Launch TUI
//!   bloom build [options]            Compute points + cages, write JSON/SVG
//!   bloom instance <seed.obj> [opts] Instance a seed mesh onto every cage
//!   bloom params                     List editable parameters

use std::env;
use std::fs;
use std::io::{self, stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::{DynamicImage, RgbaImage};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use ratatui_image::{
    StatefulImage,
    picker::{Picker, ProtocolType},
    protocol::StatefulProtocol,
};
use resvg::usvg;
use tiny_skia::Pixmap;

use bloom_core::{
    Bloom, BloomConfig, BloomPoint, Cage, CancelToken, Mesh, Param, Track, build_cages,
    compute_points, instance_on_cages, parse_obj, pyramid, write_obj,
};

mod render;
use render::render_svg;

// Preview rendering constants - wide aspect ratio for terminal display
const IMAGE_WIDTH: u32 = 1600;
const IMAGE_HEIGHT: u32 = 900;

/// Render the current layout to an image for the TUI preview.
fn layout_to_image(points: &[BloomPoint], cages: &[Cage], spin_degrees: f64) -> DynamicImage {
    let svg = render_svg(points, cages, spin_degrees, IMAGE_WIDTH, IMAGE_HEIGHT);

    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(&svg, &options).expect("Failed to parse generated SVG");

    let mut pixmap = Pixmap::new(IMAGE_WIDTH, IMAGE_HEIGHT).expect("Failed to create pixmap");

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let rgba = RgbaImage::from_raw(IMAGE_WIDTH, IMAGE_HEIGHT, pixmap.take())
        .expect("Failed to create image");

    DynamicImage::ImageRgba8(rgba)
}

/// Result from background layout generation.
struct LayoutResult {
    points: Vec<BloomPoint>,
    cages: Vec<Cage>,
    gen_time_ms: f64,
    error: Option<String>,
}

/// Application state for the TUI.
struct App {
    /// Current parameter values being edited
    config: BloomConfig,
    /// Parameter list selection
    param_state: ListState,
    /// All editable parameters
    params: Vec<Param>,
    /// Latest computed layout
    points: Vec<BloomPoint>,
    cages: Vec<Cage>,
    /// Last generation time
    gen_time_ms: f64,
    /// Last generation error, if any
    gen_error: Option<String>,
    /// Should exit
    should_quit: bool,
    /// Is layout generation in progress?
    is_loading: bool,
    /// Flag to regenerate after current generation completes
    needs_regenerate: bool,
    /// Channel to receive layout results
    result_rx: Receiver<LayoutResult>,
    result_tx: Sender<LayoutResult>,
    /// Animation frame counter for the loading spinner
    spinner_frame: usize,
    /// Image picker for terminal protocol detection
    picker: Picker,
    /// Current rendered image protocol state
    image_state: Option<Box<dyn StatefulProtocol>>,
    /// Flag to indicate image needs re-rendering
    needs_image_update: bool,
    /// Turntable spin
    spinning: bool,
    spin_time: f64,
    spin_track: Track,
    /// Last snapshot filename, for the stats panel
    last_snapshot: Option<String>,
    /// Zoom level (1.0 = fit to view)
    zoom: f64,
    /// Pan offset in layout units
    pan_x: f64,
    pan_y: f64,
}

impl App {
    fn new(config: BloomConfig) -> Result<Self, String> {
        config.validate().map_err(|e| e.to_string())?;

        let params: Vec<Param> = Param::all().to_vec();
        let mut param_state = ListState::default();
        param_state.select(Some(0));

        let (result_tx, result_rx) = mpsc::channel();

        // Initialize image picker - force Sixel protocol
        let mut picker = Picker::from_termios().unwrap_or_else(|_| Picker::new((8, 16)));
        picker.protocol_type = ProtocolType::Sixel;

        let mut app = App {
            config,
            param_state,
            params,
            points: Vec::new(),
            cages: Vec::new(),
            gen_time_ms: 0.0,
            gen_error: None,
            should_quit: false,
            is_loading: false,
            needs_regenerate: false,
            result_rx,
            result_tx,
            spinner_frame: 0,
            picker,
            image_state: None,
            needs_image_update: true,
            spinning: false,
            spin_time: 0.0,
            spin_track: Track::turntable(),
            last_snapshot: None,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        };

        app.regenerate_layout();
        Ok(app)
    }

    fn selected_param(&self) -> Param {
        self.params[self.param_state.selected().unwrap_or(0)]
    }

    fn spin_degrees(&self) -> f64 {
        self.spin_track.sample(self.spin_time)
    }

    /// Kick off a full recompute on a worker thread.
    ///
    /// Every parameter edit lands here: there is no partial update, the
    /// whole layout is re-walked each time. Edits made while a compute is
    /// in flight coalesce into one follow-up run.
    fn regenerate_layout(&mut self) {
        if self.is_loading {
            self.needs_regenerate = true;
            return;
        }

        self.needs_regenerate = false;
        let config = self.config;
        let tx = self.result_tx.clone();

        self.is_loading = true;

        thread::spawn(move || {
            let start = Instant::now();
            let result = match compute_points(&config) {
                Ok(points) => {
                    let cages = build_cages(&points, config.neighbor_offsets);
                    LayoutResult {
                        points,
                        cages,
                        gen_time_ms: start.elapsed().as_secs_f64() * 1000.0,
                        error: None,
                    }
                }
                Err(e) => LayoutResult {
                    points: Vec::new(),
                    cages: Vec::new(),
                    gen_time_ms: start.elapsed().as_secs_f64() * 1000.0,
                    error: Some(e.to_string()),
                },
            };
            let _ = tx.send(result);
        });
    }

    fn check_layout_result(&mut self) {
        // Drain all pending results, keep only the latest
        let mut latest: Option<LayoutResult> = None;
        while let Ok(result) = self.result_rx.try_recv() {
            latest = Some(result);
        }

        if let Some(result) = latest {
            self.points = result.points;
            self.cages = result.cages;
            self.gen_time_ms = result.gen_time_ms;
            self.gen_error = result.error;
            self.is_loading = false;
            self.needs_image_update = true;

            // If the user kept editing while we were generating, go again
            if self.needs_regenerate {
                self.regenerate_layout();
            }
        }
    }

    fn update_image(&mut self) {
        if self.needs_image_update && !self.is_loading {
            let img = layout_to_image(&self.points, &self.cages, self.spin_degrees());
            let img = apply_view(img, self.zoom, self.pan_x, self.pan_y);
            self.image_state = Some(self.picker.new_resize_protocol(img));
            self.needs_image_update = false;
        }
    }

    fn adjust_param(&mut self, steps: f64) {
        let param = self.selected_param();
        let value = param.get(&self.config) + steps * param.step();
        param.set(&mut self.config, value);
        self.regenerate_layout();
    }

    fn next_param(&mut self) {
        let i = match self.param_state.selected() {
            Some(i) => (i + 1) % self.params.len(),
            None => 0,
        };
        self.param_state.select(Some(i));
    }

    fn prev_param(&mut self) {
        let i = match self.param_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.params.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.param_state.select(Some(i));
    }

    fn toggle_spin(&mut self) {
        self.spinning = !self.spinning;
    }

    /// Write the current view to a timestamped SVG next to the cwd.
    fn take_snapshot(&mut self) {
        let filename = format!(
            "bloom_snapshot_{}.svg",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let svg = render_svg(
            &self.points,
            &self.cages,
            self.spin_degrees(),
            IMAGE_WIDTH,
            IMAGE_HEIGHT,
        );
        match fs::write(&filename, svg) {
            Ok(()) => self.last_snapshot = Some(filename),
            Err(e) => self.gen_error = Some(format!("snapshot failed: {}", e)),
        }
    }

    fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.25).min(10.0);
        self.needs_image_update = true;
    }

    fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.25).max(0.5);
        if self.zoom <= 1.0 {
            self.pan_x = 0.0;
            self.pan_y = 0.0;
        }
        self.needs_image_update = true;
    }

    fn reset_view(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.needs_image_update = true;
    }

    fn pan(&mut self, dx: f64, dy: f64) {
        let pan_speed = 50.0 / self.zoom;
        self.pan_x += dx * pan_speed;
        self.pan_y += dy * pan_speed;
        self.needs_image_update = true;
    }
}

/// Apply zoom/pan by cropping the rendered image.
fn apply_view(img: DynamicImage, zoom: f64, pan_x: f64, pan_y: f64) -> DynamicImage {
    if zoom <= 1.0 {
        return img;
    }
    let w = img.width() as f64;
    let h = img.height() as f64;
    let crop_w = (w / zoom).max(1.0);
    let crop_h = (h / zoom).max(1.0);
    let cx = (w - crop_w) / 2.0 + pan_x;
    let cy = (h - crop_h) / 2.0 + pan_y;
    let cx = cx.clamp(0.0, w - crop_w);
    let cy = cy.clamp(0.0, h - crop_h);
    img.crop_imm(cx as u32, cy as u32, crop_w as u32, crop_h as u32)
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() >= 2 {
        match args[1].as_str() {
            "build" => {
                cmd_build(&args[2..]);
                return;
            }
            "instance" => {
                cmd_instance(&args[2..]);
                return;
            }
            "params" => {
                cmd_params();
                return;
            }
            "help" | "--help" | "-h" => {
                print_usage(&args[0]);
                return;
            }
            _ => {}
        }
    }

    // Launch TUI, optionally with a config file
    let mut config = BloomConfig::default();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--config" {
            i += 1;
            if i < args.len() {
                config = load_config_file(&args[i]);
            }
        }
        i += 1;
    }

    if let Err(e) = run_tui(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_tui(config: BloomConfig) -> Result<(), String> {
    enable_raw_mode().map_err(|e| e.to_string())?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| e.to_string())?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout())).map_err(|e| e.to_string())?;

    let mut app = App::new(config)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode().map_err(|e| e.to_string())?;
    stdout()
        .execute(LeaveAlternateScreen)
        .map_err(|e| e.to_string())?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), String> {
    loop {
        app.check_layout_result();

        // Advance the turntable while spinning; the cycle snap back to 0
        // is invisible because one cycle is one golden angle.
        if app.spinning {
            app.spin_time += 0.05;
            app.needs_image_update = true;
        }

        app.update_image();

        if app.is_loading {
            app.spinner_frame = (app.spinner_frame + 1) % 8;
        }

        terminal
            .draw(|frame| ui(frame, app))
            .map_err(|_| "Draw error".to_string())?;

        if event::poll(Duration::from_millis(50)).map_err(|e| e.to_string())? {
            if let Event::Key(key) = event::read().map_err(|e| e.to_string())? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            app.should_quit = true;
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            app.prev_param();
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            app.next_param();
                        }
                        KeyCode::Left | KeyCode::Char('h') => {
                            app.adjust_param(-1.0);
                        }
                        KeyCode::Right | KeyCode::Char('l') => {
                            app.adjust_param(1.0);
                        }
                        KeyCode::Char('[') => {
                            app.adjust_param(-10.0);
                        }
                        KeyCode::Char(']') => {
                            app.adjust_param(10.0);
                        }
                        KeyCode::Char(' ') => {
                            app.toggle_spin();
                        }
                        KeyCode::Char('p') => {
                            app.take_snapshot();
                        }
                        // Zoom controls
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            app.zoom_in();
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') => {
                            app.zoom_out();
                        }
                        KeyCode::Char('0') | KeyCode::Char('r') => {
                            app.reset_view();
                        }
                        // Pan controls (WASD)
                        KeyCode::Char('w') => {
                            app.pan(0.0, -1.0);
                        }
                        KeyCode::Char('s') => {
                            app.pan(0.0, 1.0);
                        }
                        KeyCode::Char('a') => {
                            app.pan(-1.0, 0.0);
                        }
                        KeyCode::Char('d') => {
                            app.pan(1.0, 0.0);
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(5)])
        .split(frame.area());

    let top_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(40)])
        .split(main_layout[0]);

    let sidebar_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(9)])
        .split(top_layout[0]);

    // Parameter list
    let items: Vec<ListItem> = app
        .params
        .iter()
        .map(|p| ListItem::new(format!("{:16} {:>8.2}", p.name(), p.get(&app.config))))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Parameters ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("► ");

    frame.render_stateful_widget(list, sidebar_layout[0], &mut app.param_state.clone());

    // Stats panel
    let snapshot_line = app.last_snapshot.as_deref().unwrap_or("-");
    let stats_text = if let Some(err) = &app.gen_error {
        format!("ERROR\n{}", err)
    } else {
        format!(
            "Points: {}\nCages: {}\nGen: {:.1}ms\nZoom: {:.0}%\nSpin: {}\nSnap: {}",
            app.points.len(),
            app.cages.len(),
            app.gen_time_ms,
            app.zoom * 100.0,
            if app.spinning { "on" } else { "off" },
            snapshot_line,
        )
    };
    let stats = Paragraph::new(stats_text)
        .block(
            Block::default()
                .title(" Stats ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(stats, sidebar_layout[1]);

    // Spinner animation frames
    let spinner_chars = ['|', '/', '-', '\\', '|', '/', '-', '\\'];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let image_title = if app.is_loading {
        format!(" [{}] Computing... ", spinner)
    } else {
        format!(
            " bloom  N={}  spin={:.1}° ",
            app.config.num_points,
            app.spin_degrees()
        )
    };

    let border_color = if app.is_loading { Color::Yellow } else { Color::Green };

    let image_block = Block::default()
        .title(image_title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner_area = image_block.inner(top_layout[1]);
    frame.render_widget(image_block, top_layout[1]);

    if let Some(ref mut image_state) = app.image_state {
        let image_widget = StatefulImage::new(None);
        frame.render_stateful_widget(image_widget, inner_area, image_state);
    }

    // Bottom: selected parameter detail + help
    let bottom_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(main_layout[1]);

    let param = app.selected_param();
    let range = param.range();

    let value_block = Block::default()
        .title(format!(" {} ", param.name()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let value_text = Paragraph::new(format!("{:.2}", param.get(&app.config)))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(value_block);

    frame.render_widget(value_text, bottom_layout[0]);

    let range_block = Block::default()
        .title(" Range ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let range_text = Paragraph::new(format!("[{}, {}]", range.min, range.max))
        .alignment(Alignment::Center)
        .block(range_block);

    frame.render_widget(range_text, bottom_layout[1]);

    let help = Paragraph::new("↑↓ param  ←→ adjust  [ ] coarse\nSpace spin  p snapshot\n+/- zoom  WASD pan  q quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, bottom_layout[2]);
}

// ============ CLI Commands ============

/// Output format for the build command.
#[derive(Clone, Copy, PartialEq)]
enum OutputFormat {
    Json,
    Svg,
}

/// JSON output: config plus the full layout.
#[derive(Serialize)]
struct JsonBloom<'a> {
    config: &'a BloomConfig,
    points: &'a [BloomPoint],
    cages: &'a [Cage],
}

fn print_usage(prog: &str) {
    eprintln!("bloom - phyllotaxis bloom generation");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} [--config <yaml>]               Launch TUI", prog);
    eprintln!("  {} build [options]", prog);
    eprintln!("  {} instance <seed.obj> [options]", prog);
    eprintln!("  {} params", prog);
    eprintln!();
    eprintln!("Shared options:");
    eprintln!("  --config <file>        Load parameters from a YAML file");
    eprintln!("  -n, --points <n>       Point count [20, 500] (default: 300)");
    eprintln!("  --radius <r>           Sphere radius (default: 20)");
    eprintln!("  --delta-theta <deg>    Azimuth step (default: 137.5)");
    eprintln!("  --delta-height <h>     Height step [0.05, 1] (default: 0.25)");
    eprintln!("  --start-angle <deg>    First elevation [-85, 85] (default: 0)");
    eprintln!("  --thickness <t>        Thickness scale [0, 10] (default: 5)");
    eprintln!("  --growth <g>           Thickness growth [-10, 10] (default: 0)");
    eprintln!("  --offsets <n1,n2>      Neighbor offsets (default: 8,13)");
    eprintln!();
    eprintln!("Build options:");
    eprintln!("  -f, --format <fmt>     Output format: json, svg (default: json)");
    eprintln!("  -o, --output <file>    Output file (- for stdout, default: stdout)");
    eprintln!("  --progress             Report build progress on stderr");
    eprintln!();
    eprintln!("Instance options:");
    eprintln!("  --builtin              Use the builtin pyramid seed");
    eprintln!("  -o, --output <file>    Output OBJ file (- for stdout, default: stdout)");
    eprintln!();
    eprintln!("The seed OBJ must contain exactly one object with faces.");
    eprintln!();
    eprintln!("TUI controls:");
    eprintln!("  ↑/↓ or j/k    Select parameter");
    eprintln!("  ←/→ or h/l    Adjust (fine);  [ / ] coarse");
    eprintln!("  Space         Toggle turntable spin");
    eprintln!("  p             Write timestamped SVG snapshot");
    eprintln!("  q / Esc       Quit");
}

fn cmd_params() {
    println!("Editable parameters:");
    let defaults = BloomConfig::default();
    for param in Param::all() {
        let range = param.range();
        println!(
            "  {:18} [{:>6}, {:>6}]  default {}",
            param.name(),
            range.min,
            range.max,
            param.get(&defaults)
        );
    }
    println!();
    println!("Construction-time settings (config file / flags only):");
    println!("  radius             default {}", defaults.radius);
    println!(
        "  neighbor_offsets   default {},{}",
        defaults.neighbor_offsets.0, defaults.neighbor_offsets.1
    );
}

fn load_config_file(path: &str) -> BloomConfig {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read config {}: {}", path, e);
        std::process::exit(1);
    });
    serde_yaml::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Failed to parse config {}: {}", path, e);
        std::process::exit(1);
    })
}

fn parse_offsets(value: &str) -> (usize, usize) {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() == 2 {
        if let (Ok(n1), Ok(n2)) = (parts[0].trim().parse(), parts[1].trim().parse()) {
            return (n1, n2);
        }
    }
    eprintln!("Bad --offsets value '{}', expected 'n1,n2'", value);
    std::process::exit(1);
}

/// Parse the shared config flags out of an argument list.
///
/// Returns the config and the arguments it did not consume.
fn parse_config_args(args: &[String]) -> (BloomConfig, Vec<String>) {
    let mut config = BloomConfig::default();
    let mut rest = Vec::new();

    // --config applies first so flags can override the file
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--config" {
            i += 1;
            if i < args.len() {
                config = load_config_file(&args[i]);
            }
        }
        i += 1;
    }

    let numeric = |args: &[String], i: &mut usize, name: &str| -> f64 {
        *i += 1;
        if *i >= args.len() {
            eprintln!("{} requires a value", name);
            std::process::exit(1);
        }
        args[*i].parse().unwrap_or_else(|_| {
            eprintln!("{} value '{}' is not a number", name, args[*i]);
            std::process::exit(1);
        })
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1; // already applied
            }
            "-n" | "--points" => {
                config.num_points = numeric(args, &mut i, "--points") as usize;
            }
            "--radius" => {
                config.radius = numeric(args, &mut i, "--radius");
            }
            "--delta-theta" => {
                config.delta_theta = numeric(args, &mut i, "--delta-theta");
            }
            "--delta-height" => {
                config.delta_height = numeric(args, &mut i, "--delta-height");
            }
            "--start-angle" => {
                config.start_angle = numeric(args, &mut i, "--start-angle");
            }
            "--thickness" => {
                config.thickness = numeric(args, &mut i, "--thickness");
            }
            "--growth" => {
                config.thickness_growth = numeric(args, &mut i, "--growth");
            }
            "--offsets" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("--offsets requires a value");
                    std::process::exit(1);
                }
                config.neighbor_offsets = parse_offsets(&args[i]);
            }
            other => rest.push(other.to_string()),
        }
        i += 1;
    }

    (config, rest)
}

/// Progress reporter for long builds: a line per 10%.
fn progress_reporter() -> impl FnMut(usize, usize) {
    let mut last_pct = 0;
    move |done: usize, total: usize| {
        if total == 0 {
            return;
        }
        let pct = done * 100 / total;
        if pct >= last_pct + 10 {
            last_pct = pct - pct % 10;
            eprintln!("  {}%", last_pct);
        }
    }
}

fn cmd_build(args: &[String]) {
    let (config, rest) = parse_config_args(args);

    let mut format = OutputFormat::Json;
    let mut output_path: Option<&str> = None;
    let mut progress = false;

    let mut i = 0;
    while i < rest.len() {
        match rest[i].as_str() {
            "-f" | "--format" => {
                i += 1;
                if i < rest.len() {
                    format = match rest[i].to_lowercase().as_str() {
                        "json" => OutputFormat::Json,
                        "svg" => OutputFormat::Svg,
                        other => {
                            eprintln!("Unknown format: {}. Use 'json' or 'svg'.", other);
                            std::process::exit(1);
                        }
                    };
                }
            }
            "-o" | "--output" => {
                i += 1;
                if i < rest.len() {
                    output_path = Some(&rest[i]);
                }
            }
            "--progress" => {
                progress = true;
            }
            other => {
                eprintln!("Unknown build option: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut bloom = Bloom::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let start = Instant::now();
    let result = if progress {
        eprintln!("Building bloom ({} points)...", config.num_points);
        bloom.recompute_cancellable(&CancelToken::new(), progress_reporter())
    } else {
        bloom.recompute()
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let points = bloom.current_points();
    let cages = bloom.current_cages();
    eprintln!(
        "Computed {} points, {} cages in {:?}",
        points.len(),
        cages.len(),
        start.elapsed()
    );

    let output = match format {
        OutputFormat::Json => {
            let json = JsonBloom { config: bloom.config(), points, cages };
            serde_json::to_string(&json).expect("Failed to serialize JSON")
        }
        OutputFormat::Svg => render_svg(points, cages, 0.0, IMAGE_WIDTH, IMAGE_HEIGHT),
    };

    match output_path {
        Some("-") | None => {
            println!("{}", output);
        }
        Some(path) => {
            fs::write(path, &output).expect("Failed to write output file");
            eprintln!("Wrote: {}", path);
        }
    }
}

/// Load and validate the seed mesh: exactly one object, and it must
/// actually be a mesh (have faces). Checked before anything is built.
fn load_seed(path: &str) -> Mesh {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read seed {}: {}", path, e);
        std::process::exit(1);
    });

    let meshes = parse_obj(&content).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if meshes.len() != 1 {
        eprintln!(
            "Error: seed file must contain exactly one object, found {}",
            meshes.len()
        );
        std::process::exit(1);
    }

    let seed = meshes.into_iter().next().unwrap();
    if !seed.has_faces() {
        eprintln!("Error: seed object '{}' has no faces", seed.name);
        std::process::exit(1);
    }
    seed
}

fn cmd_instance(args: &[String]) {
    let (config, rest) = parse_config_args(args);

    let mut seed_path: Option<&str> = None;
    let mut output_path: Option<&str> = None;
    let mut builtin = false;

    let mut i = 0;
    while i < rest.len() {
        match rest[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < rest.len() {
                    output_path = Some(&rest[i]);
                }
            }
            "--builtin" => {
                builtin = true;
            }
            path => {
                if seed_path.is_none() {
                    seed_path = Some(path);
                } else {
                    eprintln!("Unexpected argument: {}", path);
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    // Seed selection is validated before any geometry is computed.
    let seed = if builtin {
        pyramid()
    } else {
        let path = seed_path.unwrap_or_else(|| {
            eprintln!("Error: seed OBJ required (or pass --builtin)");
            std::process::exit(1);
        });
        eprintln!("Loading seed: {}", path);
        load_seed(path)
    };

    let points = match compute_points(&config) {
        Ok(points) => points,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let cages = build_cages(&points, config.neighbor_offsets);
    eprintln!("Computed {} points, {} cages", points.len(), cages.len());

    let start = Instant::now();
    let instances = instance_on_cages(&cages, &seed, &CancelToken::new(), progress_reporter());
    eprintln!(
        "Instanced {} petals in {:?}",
        instances.len(),
        start.elapsed()
    );

    let output = write_obj(&instances);

    match output_path {
        Some("-") | None => {
            println!("{}", output);
        }
        Some(path) => {
            fs::write(path, &output).expect("Failed to write output file");
            eprintln!("Wrote: {}", path);
        }
    }
}
