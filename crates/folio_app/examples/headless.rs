//! Headless Page Session
//!
//! Drives the portfolio page against a static document layout and prints
//! what a renderer would draw: the entrance, a pointer sweep over the hero,
//! a wheel scroll down the page and a navigation click.
//!
//! Run with: cargo run -p folio_app --example headless [-- page.toml]
//!
//! Set `RUST_LOG=folio_layout=debug` to watch triggers and pose changes.

use anyhow::Context;
use folio_app::prelude::*;
use tracing_subscriber::EnvFilter;

const FRAME_MS: Millis = 1000.0 / 60.0;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PageConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => PageConfig::default(),
    };
    let content = PortfolioContent::builtin().context("parsing built-in content")?;
    let mut page = Page::new(content, config).context("composing page")?;

    let mut layout = DocumentLayout::stacked(
        Size::new(1440.0, 1024.0),
        [
            ("about", 1024.0),
            ("experience", 1600.0),
            ("skills", 900.0),
            ("projects", 1400.0),
            ("contact", 800.0),
            ("footer", 300.0),
        ],
    );
    for i in 0..page.content().experience.entries.len() {
        let top = 1200.0 + i as f32 * 350.0;
        layout.set_element(format!("experience.card.{i}"), Rect::new(0.0, top, 1440.0, 300.0));
    }

    let mut now = 0.0;
    page.mount(&layout, now);

    // entrance
    while !page.hero().is_entrance_complete() {
        now += FRAME_MS;
        page.step(now, &mut layout);
    }
    tracing::info!(now, "entrance complete");
    now = settle(&mut page, &mut layout, now, 250.0);

    // pointer sweep
    for x in [600.0, 800.0, 1000.0, 1200.0, 900.0, 500.0] {
        now += 40.0;
        page.handle_event(&InputEvent::PointerMove { x, y: 500.0 }, now, &layout);
        let frame = page.step(now, &mut layout);
        println!(
            "pointer x={x:>6.0} pose={:<5} sprite x={:>7.1}",
            frame.pose.as_str(),
            frame.sprite.center().x
        );
    }
    now = settle(&mut page, &mut layout, now, 300.0);
    println!("idle pose={}", page.pose().as_str());

    // scroll down the page
    page.handle_event(&InputEvent::Wheel { delta_y: 3000.0 }, now, &layout);
    for _ in 0..6 {
        now = settle(&mut page, &mut layout, now, 250.0);
        report(&page.step(now, &mut layout));
    }

    // back to the top through the navigation
    page.navigate("about", &layout);
    now = settle(&mut page, &mut layout, now, 500.0);
    report(&page.step(now, &mut layout));

    Ok(())
}

fn settle(page: &mut Page, layout: &mut DocumentLayout, from: Millis, ms: Millis) -> Millis {
    let mut now = from;
    while now < from + ms {
        now += FRAME_MS;
        page.step(now, layout);
    }
    now
}

fn report(frame: &Frame) {
    let revealed = frame
        .states
        .iter()
        .filter(|(target, state)| {
            target.as_str().contains(".card.") && state.opacity > 0.99
        })
        .count();
    println!(
        "t={:>7.0} scroll={:>7.1} active={:<10} scrolled={} cards visible={revealed}",
        frame.now, frame.scroll_y, frame.active_section, frame.is_scrolled
    );
}
