/// Diagnostic tool to verify the data → tree → layout pipeline on the bundled sample sets
use anyhow::Context;
use treemap_rs::layout::{compute_layout, Layout, LayoutConfig};
use treemap_rs::tree::adapter::MapDataAdapter;
use treemap_rs::tree::arena::{MapTree, NodeId};
use treemap_rs::tree::{build_tree, DataSpec};

struct Country {
    name: &'static str,
    area: f64,
    population: f64,
}

const fn country(name: &'static str, area: f64, population: f64) -> Country {
    Country {
        name,
        area,
        population,
    }
}

const EU: [Country; 28] = [
    country("Austria", 83858.0, 8169929.0),
    country("Belgium", 30510.0, 1100702.0),
    country("Bulgaria", 110910.0, 7621337.0),
    country("Croatia", 56542.0, 4490751.0),
    country("Cyprus", 9248.0, 803147.0),
    country("Czech Republic", 78866.0, 10674947.0),
    country("Denmark", 43094.0, 5368854.0),
    country("Estonia", 45226.0, 1294236.0),
    country("Finland", 338424.0, 5410233.0),
    country("France", 643801.0, 66996000.0),
    country("Germany", 357021.0, 81799600.0),
    country("Greece", 131940.0, 11606813.0),
    country("Hungary", 93030.0, 10075034.0),
    country("Ireland", 70280.0, 4581269.0),
    country("Italy", 301230.0, 60665625.0),
    country("Latvia", 64589.0, 1973127.0),
    country("Lithuania", 65200.0, 2881020.0),
    country("Luxembourg", 2586.0, 512000.0),
    country("Malta", 316.0, 397499.0),
    country("Netherlands", 41526.0, 17144600.0),
    country("Poland", 312685.0, 38625478.0),
    country("Portugal", 92391.0, 10617999.0),
    country("Romania", 238391.0, 19043767.0),
    country("Slovakia", 48845.0, 5422366.0),
    country("Slovenia", 20273.0, 2048847.0),
    country("Spain", 505782.0, 46777373.0),
    country("Sweden", 449964.0, 9515744.0),
    country("United Kingdom", 243610.0, 65110000.0),
];

fn flat_sample() -> DataSpec {
    let children = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0]
        .iter()
        .enumerate()
        .map(|(i, &v)| DataSpec::leaf(format!("data{}", i + 1), v))
        .collect();
    DataSpec::node("flat sample", children)
}

fn nested_sample() -> DataSpec {
    DataSpec::node(
        "nested sample",
        vec![
            DataSpec::node(
                "data1",
                vec![
                    DataSpec::node(
                        "data1_1",
                        vec![
                            DataSpec::leaf("data1_1_1", 0.5),
                            DataSpec::leaf("data1_1_2", 1.0),
                            DataSpec::leaf("data1_1_3", 2.0),
                        ],
                    ),
                    DataSpec::leaf("data1_2", 6.0),
                    DataSpec::leaf("data1_3", 3.0),
                    DataSpec::leaf("data1_4", 1.0),
                ],
            ),
            DataSpec::leaf("data2", 3.0),
            DataSpec::leaf("data3", 2.0),
            DataSpec::leaf("data4", 2.0),
            DataSpec::leaf("data5", 1.0),
        ],
    )
}

fn parse_dimension(arg: Option<String>, default: f64) -> anyhow::Result<f64> {
    match arg {
        None => Ok(default),
        Some(raw) => {
            let value: f64 = raw
                .parse()
                .with_context(|| format!("invalid dimension '{}'", raw))?;
            anyhow::ensure!(value > 0.0, "dimension must be positive, got {}", value);
            Ok(value)
        }
    }
}

fn report(title: &str, tree: &MapTree, root: NodeId, config: &LayoutConfig) {
    let layout = compute_layout(tree, root, config);

    println!("\n=== {} ===", title);
    println!(
        "Root '{}' = {} ({} nodes, {} rects)",
        tree.name(root),
        tree.value(root),
        tree.depth_first(root).count(),
        layout.rects.len()
    );

    for rect in &layout.rects {
        let b = rect.bounds;
        println!(
            "    {:indent$}'{}' = {} - rect: {:.1}x{:.1} at ({:.1}, {:.1}), aspect {:.2}",
            "",
            tree.name(rect.node),
            tree.value(rect.node),
            b.w,
            b.h,
            b.x,
            b.y,
            b.aspect_ratio(),
            indent = rect.depth as usize * 2
        );
    }

    print_coverage(&layout, config);
}

fn print_coverage(layout: &Layout, config: &LayoutConfig) {
    // Only the top level has to tile the viewport
    let top_level: Vec<_> = layout.rects.iter().filter(|r| r.depth == 1).collect();
    let covered: f64 = top_level.iter().map(|r| r.bounds.area()).sum();
    let viewport = config.width * config.height;
    let worst = top_level
        .iter()
        .map(|r| r.bounds.aspect_ratio())
        .fold(0.0, f64::max);

    println!("    Top-level area: {:.0}px² of {:.0}px²", covered, viewport);
    if viewport > 0.0 {
        println!("    Coverage: {:.3}%", covered / viewport * 100.0);
    }
    println!("    Worst top-level aspect ratio: {:.3}", worst);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("treemap_rs=debug".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let defaults = LayoutConfig::default();
    let config = LayoutConfig {
        width: parse_dimension(args.next(), defaults.width)?,
        height: parse_dimension(args.next(), defaults.height)?,
        ..defaults
    };

    println!("=== DIAGNOSTIC: Data → Tree → Layout Pipeline ===");
    println!("Viewport: {:.0}x{:.0}", config.width, config.height);

    let (tree, root) = build_tree(&flat_sample())?;
    report("Flat sample", &tree, root, &config);

    let (tree, root) = build_tree(&nested_sample())?;
    report("Nested sample", &tree, root, &config);

    let mut tree = MapTree::new();
    let mut eu = MapDataAdapter::new(
        &mut tree,
        "European Union",
        EU.into_iter().collect(),
        |c: &Country| c.area,
        |c: &Country| c.name.to_string(),
    )?;
    report("EU by area (km²)", &tree, eu.node(), &config);

    eu.set_value_function(&mut tree, |c: &Country| c.population);
    report("EU by population", &tree, eu.node(), &config);

    Ok(())
}
