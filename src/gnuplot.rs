// SPDX: CC0-1.0

//! Gnuplot scripts for a frame of canvases, stacked top to bottom.

use crate::{render::Canvas, Number, Point};
use chrono::{DateTime, Local};
use std::io::{self, Write};

const CURVE_COLOR: &str = "#1f77b4";

pub fn output_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "gnuplot"
    )
}

fn write_block<W: Write>(mut out: W, name: &str, points: &[Point<Number>]) -> io::Result<()> {
    writeln!(out, "${name} << EOD")?;
    for Point { x, y } in points {
        writeln!(out, "{x} {y}")?;
    }
    writeln!(out, "EOD")
}

/// Writes a self-contained script (data inlined) plotting `canvases`.
pub fn write_script<W: Write>(mut out: W, canvases: &[Canvas], caption: &str) -> io::Result<()> {
    writeln!(out, "reset")?;

    for (idx, canvas) in canvases.iter().enumerate() {
        write_block(&mut out, &format!("canvas{idx}"), &canvas.series)?;
        for (m, mark) in canvas.marks.iter().enumerate() {
            write_block(&mut out, &format!("canvas{idx}_mark{m}"), &mark.points)?;
        }
    }

    writeln!(
        out,
        r#"set multiplot layout {rows},1 title "{caption}" noenhanced"#,
        rows = canvases.len().max(1)
    )?;
    writeln!(out, "set grid")?;
    writeln!(out, "unset key")?;

    for (idx, canvas) in canvases.iter().enumerate() {
        writeln!(out, r#"set title "{}" noenhanced"#, canvas.title)?;
        write!(out, "plot $canvas{idx} using 1:2 with lines lc rgb '{CURVE_COLOR}'")?;
        for (m, mark) in canvas.marks.iter().enumerate() {
            write!(
                out,
                ", \\\n  $canvas{idx}_mark{m} using 1:2 with linespoints pt 7 lc rgb '{}'",
                mark.color.rgb()
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "unset multiplot")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Color, Mark};

    #[test]
    fn script_inlines_every_series() {
        let canvases = [
            Canvas {
                title: String::from("f = x"),
                series: vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 1.0 }],
                marks: vec![Mark {
                    points: vec![Point { x: 0.5, y: 0.5 }],
                    color: Color::Blue,
                }],
            },
            Canvas {
                title: String::from("f'"),
                series: vec![Point { x: 0.0, y: 1.0 }],
                marks: Vec::new(),
            },
        ];
        let mut buf = Vec::new();
        write_script(&mut buf, &canvases, "x").unwrap();
        let script = String::from_utf8(buf).unwrap();

        assert!(script.contains("$canvas0 << EOD\n0 0\n1 1\nEOD\n"));
        assert!(script.contains("$canvas0_mark0 << EOD\n0.5 0.5\nEOD\n"));
        assert!(script.contains("set multiplot layout 2,1"));
        assert!(script.contains(r#"set title "f'" noenhanced"#));
        assert!(script.contains("lc rgb '#0000ff'"));
        assert!(script.trim_end().ends_with("unset multiplot"));
    }

    #[test]
    fn filename_is_timestamped() {
        let now = Local::now();
        let name = output_filename(now);
        assert!(name.starts_with("deltax_output-"));
        assert!(name.ends_with(".gnuplot"));
    }
}
