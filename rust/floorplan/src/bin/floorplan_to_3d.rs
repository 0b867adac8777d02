// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Convert 2D floor plan primitives into a 3D building (OBJ output)
//!
//! Usage:
//!   floorplan-to-3d <input.json|input.dxf> [options]

use anyhow::{bail, Context, Result};
use floorplan3d::{
    CadEntity, FloorplanConfig, GeneratedModel, LineDetection, Point2D, Session,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// JSON input: CAD entities or the output of a line detector
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SourceFile {
    Cad { entities: Vec<CadEntity> },
    Detected(LineDetection),
}

struct Options {
    input: String,
    floors: Option<u32>,
    floor_height: Option<f64>,
    fov: Option<f64>,
    toggles: Vec<Point2D>,
    output: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return Ok(());
    }

    let options = parse_args(&args)?;
    let mut config = FloorplanConfig::from_env();
    if let Some(floors) = options.floors {
        config.building.floor_count = floors;
    }
    if let Some(height) = options.floor_height {
        config.building.floor_height = height;
    }
    if let Some(fov) = options.fov {
        config.camera_fov_degrees = fov;
    }

    let mut session = Session::new(config);
    session
        .set_parameters(config.building)
        .context("Invalid building parameters")?;

    println!("[1/4] Loading source: {}", options.input);
    load_source(&mut session, &options.input)?;
    println!("      {}", session.status());

    println!("[2/4] Applying {} toggles...", options.toggles.len());
    for point in &options.toggles {
        match session.toggle_at(point) {
            Some((id, is_wall)) => println!(
                "      ({:.1}, {:.1}) -> contour {} is_wall={}",
                point.x, point.y, id, is_wall
            ),
            None => println!("      ({:.1}, {:.1}) -> no contour", point.x, point.y),
        }
    }

    println!(
        "[3/4] Generating {} floors of {:.2}m...",
        config.building.floor_count, config.building.floor_height
    );
    let building = session.generate().context("Generation failed")?;
    print_summary(building);

    println!("[4/4] Writing OBJ file: {}", options.output);
    write_obj(&options.output, building)?;

    let camera = session.camera();
    println!();
    println!(
        "Camera: position ({:.2}, {:.2}, {:.2}) target ({:.2}, {:.2}, {:.2}) distance {:.2}",
        camera.position.x,
        camera.position.y,
        camera.position.z,
        camera.target.x,
        camera.target.y,
        camera.target.z,
        camera.distance
    );
    println!("Done.");
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        input: args[1].clone(),
        floors: None,
        floor_height: None,
        fov: None,
        toggles: Vec::new(),
        output: String::from("building.obj"),
    };

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .with_context(|| format!("Missing value for {}", flag))?;
        match flag {
            "--floors" => {
                options.floors = Some(value.parse().context("Invalid floors value")?);
            }
            "--floor-height" => {
                options.floor_height = Some(value.parse().context("Invalid floor height value")?);
            }
            "--fov" => {
                options.fov = Some(value.parse().context("Invalid fov value")?);
            }
            "--toggle" => options.toggles.push(parse_point(value)?),
            "--output" => options.output = value.clone(),
            other => bail!("Unknown option: {}", other),
        }
        i += 2;
    }

    Ok(options)
}

/// `X,Y` in plan coordinates
fn parse_point(value: &str) -> Result<Point2D> {
    let (x, y) = value
        .split_once(',')
        .with_context(|| format!("Expected X,Y but got '{}'", value))?;
    Ok(Point2D::new(
        x.trim().parse().context("Invalid toggle X")?,
        y.trim().parse().context("Invalid toggle Y")?,
    ))
}

fn load_source(session: &mut Session, path: &str) -> Result<()> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("dxf") => load_dxf(session, path),
        Some("json") => {
            let text =
                fs::read_to_string(path).with_context(|| format!("Cannot read '{}'", path))?;
            let source: SourceFile = serde_json::from_str(&text)
                .with_context(|| format!("Cannot parse '{}'", path))?;
            match source {
                SourceFile::Cad { entities } => {
                    session.load_cad(&entities)?;
                }
                SourceFile::Detected(detection) => {
                    session.load_detection(&detection);
                }
            }
            Ok(())
        }
        _ => bail!("Unsupported input '{}', expected .json or .dxf", path),
    }
}

#[cfg(feature = "dxf")]
fn load_dxf(session: &mut Session, path: &str) -> Result<()> {
    let entities = floorplan3d::dxf_import::load_dxf(path)?;
    session.load_cad(&entities)?;
    Ok(())
}

#[cfg(not(feature = "dxf"))]
fn load_dxf(_session: &mut Session, path: &str) -> Result<()> {
    bail!("'{}': DXF input needs the `dxf` feature", path)
}

fn print_summary(building: &GeneratedModel) {
    let bounds = building.bounds();
    let size = bounds.size();
    println!(
        "      {} walls, {} slabs, {} triangles",
        building.wall_count(),
        building.slab_count(),
        building.triangle_count()
    );
    println!(
        "      Extent: {:.2} x {:.2} x {:.2} m",
        size.x, size.y, size.z
    );
}

fn write_obj(path: &str, building: &GeneratedModel) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("Cannot create '{}'", path))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# Generated by floorplan-to-3d")?;
    writeln!(
        out,
        "# Building: {:.1}m tall, {} floors",
        building.parameters.total_height(),
        building.floors.len()
    )?;
    writeln!(out, "# Coordinate system: Y-up")?;
    writeln!(out)?;

    let mut vertex_offset: u32 = 0;
    for floor in &building.floors {
        let Some(mesh) = building.combined_floor_mesh(floor.index) else {
            continue;
        };
        writeln!(out, "o {}", floor.name)?;

        for v in mesh.positions.chunks_exact(3) {
            writeln!(out, "v {:.6} {:.6} {:.6}", v[0], v[1], v[2])?;
        }
        for n in mesh.normals.chunks_exact(3) {
            writeln!(out, "vn {:.6} {:.6} {:.6}", n[0], n[1], n[2])?;
        }
        for tri in mesh.indices.chunks_exact(3) {
            let a = tri[0] + vertex_offset + 1;
            let b = tri[1] + vertex_offset + 1;
            let c = tri[2] + vertex_offset + 1;
            writeln!(out, "f {}//{} {}//{} {}//{}", a, a, b, b, c, c)?;
        }
        writeln!(out)?;

        vertex_offset += mesh.vertex_count() as u32;
    }

    out.flush()?;
    Ok(())
}

fn print_usage() {
    println!(
        r#"Floor Plan to 3D Building Generator
====================================

Extrudes the wall contours of a floor plan into a multi-storey mesh (OBJ).

USAGE:
  floorplan-to-3d <input> [OPTIONS]

ARGUMENTS:
  <input>                   JSON source ({{"kind": "cad", "entities": [...]}} or
                            {{"kind": "detected", "lines": [...], "image_width": W,
                            "image_height": H}}), or a .dxf drawing (feature `dxf`)

OPTIONS:
  --floors <n>              Number of floors (default: FLOOR_COUNT or 1)
  --floor-height <meters>   Height per floor (default: FLOOR_HEIGHT or 2.8)
  --toggle <x,y>            Toggle the contour at a plan point (repeatable)
  --fov <degrees>           Camera field of view for framing (default: 45)
  --output <path>           Output OBJ file path (default: building.obj)
  -h, --help                Show this help message

ENVIRONMENT:
  RUST_LOG                  Log filter (default: info)"#
    );
}
