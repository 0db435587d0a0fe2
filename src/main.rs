use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use log::info;

use free_fresnel::{Attribute, FresnelError, FresnelScene, OutputValue};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let xml = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read {}", options.path))?;
    let scene = FresnelScene::from_xml(&xml).context("failed to parse scene XML")?;

    println!(
        "Loaded {} node(s) with {} sample(s)",
        scene.nodes.len(),
        scene.sample_count()
    );

    let plug = Attribute::from_name(&options.plug)
        .ok_or_else(|| FresnelError::UnknownAttribute(options.plug.clone()))?;

    for description in &scene.nodes {
        if !plug.is_output() {
            println!(
                " - {}: {} is not computed by this node",
                description.name,
                plug.long_name()
            );
            continue;
        }
        let node = description.to_node();
        info!(
            "evaluating {} with thresholds {:?}",
            description.name,
            node.evaluator().thresholds()
        );
        for (index, sample) in description.samples.iter().enumerate() {
            let (value, falloff) = node.compute_detailed(plug.long_name(), sample)?;
            let mut line = format!(
                " - {}[{index}] {}",
                description.name,
                format_output(plug, value)
            );
            if options.details {
                line.push_str(&format!(
                    " facing={:.3} scalar={:.3}",
                    falloff.facing, falloff.scalar
                ));
            }
            println!("{line}");
        }
    }

    Ok(())
}

fn format_output(plug: Attribute, value: OutputValue) -> String {
    let name = plug.long_name();
    match value {
        OutputValue::Color(color) => {
            format!("{name}=({:.2}, {:.2}, {:.2})", color.x, color.y, color.z)
        }
        OutputValue::Channel(channel) => format!("{name}={channel:.2}"),
    }
}

struct CliOptions {
    path: String,
    plug: String,
    details: bool,
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let Some(path) = args.next() else {
            return Err(anyhow!(
                "Usage: free-fresnel <scene.xml> [--plug <name>] [--details]"
            ));
        };
        let mut plug = Attribute::OutColor.long_name().to_string();
        let mut details = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--plug" => {
                    plug = args
                        .next()
                        .ok_or_else(|| anyhow!("--plug expects an attribute name"))?;
                }
                "--details" => details = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --plug <name> or --details"
                    ));
                }
            }
        }
        Ok(Self {
            path,
            plug,
            details,
        })
    }
}
