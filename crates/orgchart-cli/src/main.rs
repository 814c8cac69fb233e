use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use orgchart_app::{ChartSettings, Command, Event, EventListener, NodeId, OrgChart, RenderFrame};
use orgchart_core::LayoutDirection;
use orgchart_graph::ExpandState;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with the employee records
    data: PathBuf,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the layout direction from the settings
    #[arg(long, value_enum)]
    direction: Option<Direction>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,

    /// Command to apply after the initial render; repeatable.
    /// One of: toggle:ID, expand-all, collapse-all, search:TEXT, hover:ID,
    /// unhover, direction:horizontal|vertical
    #[arg(short, long = "command", value_parser = parse_command)]
    commands: Vec<Command>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Direction {
    Horizontal,
    Vertical,
}

impl From<Direction> for LayoutDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Horizontal => LayoutDirection::Horizontal,
            Direction::Vertical => LayoutDirection::Vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn parse_command(raw: &str) -> Result<Command, String> {
    let (verb, arg) = match raw.split_once(':') {
        Some((verb, arg)) => (verb, Some(arg)),
        None => (raw, None),
    };
    let required = |what: &str| {
        arg.filter(|value| !value.is_empty())
            .ok_or_else(|| format!("`{verb}` needs {what}, e.g. {verb}:{what}"))
    };

    match verb {
        "toggle" => Ok(Command::ToggleNode {
            id: NodeId::from(required("ID")?),
        }),
        "expand-all" => Ok(Command::ExpandAll),
        "collapse-all" => Ok(Command::CollapseAll),
        "search" => Ok(Command::Search {
            query: required("TEXT")?.to_string(),
        }),
        "hover" => Ok(Command::HoverNode {
            id: NodeId::from(required("ID")?),
        }),
        "unhover" => Ok(Command::Unhover),
        "direction" => match required("DIRECTION")? {
            "horizontal" => Ok(Command::SetLayoutDirection(LayoutDirection::Horizontal)),
            "vertical" => Ok(Command::SetLayoutDirection(LayoutDirection::Vertical)),
            other => Err(format!("unknown direction `{other}`")),
        },
        other => Err(format!("unknown command `{other}`")),
    }
}

/// Prints chart events as they are drained from the bus.
struct EventPrinter {
    json: bool,
    collected: Vec<Event>,
}

impl EventListener for EventPrinter {
    fn handle_event(&mut self, event: &Event) {
        if self.json {
            self.collected.push(event.clone());
            return;
        }
        match event {
            Event::CenterViewport { x, y } => println!("> center viewport on ({x:.1}, {y:.1})"),
            Event::HighlightNode { id, duration_ms } => {
                println!("> highlight {id} for {duration_ms} ms")
            }
            Event::ShowNotice { message } => println!("> notice: {message}"),
            Event::TooltipShow { panel } => {
                println!(
                    "> details: {} ({}) {} direct, {} total",
                    panel.name, panel.title, panel.direct_report_count, panel.total_descendant_count
                );
                for (key, value) in &panel.attributes {
                    println!(">   {key}: {value}");
                }
            }
            Event::TooltipHide => println!("> details hidden"),
            Event::DataLoaded {
                node_count,
                last_updated,
            } => match last_updated {
                Some(ts) => println!("> loaded {node_count} employees (last updated {ts})"),
                None => println!("> loaded {node_count} employees"),
            },
        }
    }
}

fn print_outline(chart: &OrgChart, frame: &RenderFrame) {
    let model = chart.model();
    for idx in model.visible_nodes() {
        let node = &model[idx];
        let marker = match (node.is_leaf(), node.state()) {
            (true, _) => "   ",
            (false, ExpandState::Expanded) => "[-]",
            (false, ExpandState::Collapsed) => "[+]",
        };
        let label = frame
            .node(node.id.as_str())
            .map(|transition| transition.label.as_str())
            .unwrap_or(node.name());
        let pos = chart
            .layout()
            .screen_position(idx)
            .unwrap_or(node.position);
        println!(
            "{:indent$}{marker} {label}  {}  @ ({:.0}, {:.0})",
            "",
            node.title(),
            pos.x,
            pos.y,
            indent = node.depth as usize * 2
        );
    }
    println!(
        "canvas {:.0} x {:.0}",
        frame.canvas_size.x, frame.canvas_size.y
    );
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => ChartSettings::load_from(path),
        None => ChartSettings::load(),
    };
    if let Some(direction) = args.direction {
        settings.direction = direction.into();
    }
    if args.save_settings {
        let path = args
            .config
            .clone()
            .or_else(ChartSettings::default_path)
            .context("No config directory, pass --config to choose a settings file")?;
        settings
            .save_to(&path)
            .with_context(|| format!("Failed to save settings to {}", path.display()))?;
        tracing::info!("Saved settings to {}", path.display());
    }

    let mut chart = OrgChart::load(&args.data, settings)
        .with_context(|| format!("Failed to load org chart from {}", args.data.display()))?;

    let mut printer = EventPrinter {
        json: args.format == Format::Json,
        collected: Vec::new(),
    };
    let mut frame = chart.render();
    chart.events().dispatch_to(&mut printer);

    for command in args.commands {
        tracing::debug!("Applying {:?}", command);
        if let Some(next) = chart.dispatch(command) {
            frame = next;
        }
        chart.events().dispatch_to(&mut printer);
    }

    match args.format {
        Format::Text => print_outline(&chart, &frame),
        Format::Json => {
            let output = serde_json::json!({
                "frame": frame,
                "events": printer.collected,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_forms() {
        assert_eq!(
            parse_command("toggle:42"),
            Ok(Command::ToggleNode {
                id: NodeId::from("42")
            })
        );
        assert_eq!(
            parse_command("search:Ada Lovelace"),
            Ok(Command::Search {
                query: "Ada Lovelace".into()
            })
        );
        assert_eq!(parse_command("collapse-all"), Ok(Command::CollapseAll));
        assert_eq!(
            parse_command("direction:horizontal"),
            Ok(Command::SetLayoutDirection(LayoutDirection::Horizontal))
        );
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(parse_command("toggle").is_err());
        assert!(parse_command("search:").is_err());
        assert!(parse_command("zoom").is_err());
        assert!(parse_command("direction:diagonal").is_err());
    }

    #[test]
    fn args_accept_repeated_commands() {
        let args = Args::try_parse_from([
            "orgchart",
            "staff.json",
            "-c",
            "expand-all",
            "--command",
            "search:omar",
            "--format",
            "json",
            "--direction",
            "horizontal",
        ])
        .unwrap();
        assert_eq!(args.commands.len(), 2);
        assert_eq!(args.format, Format::Json);
        assert_eq!(args.direction, Some(Direction::Horizontal));
        assert!(!args.save_settings);
    }

    #[test]
    fn save_settings_flag_is_opt_in() {
        let args =
            Args::try_parse_from(["orgchart", "staff.json", "--save-settings", "--config", "s.json"])
                .unwrap();
        assert!(args.save_settings);
        assert_eq!(args.config, Some(PathBuf::from("s.json")));
    }
}
