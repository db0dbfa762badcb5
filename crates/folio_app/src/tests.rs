//! End-to-end tests for the composed page
//!
//! Every test drives a `Page` against a headless `DocumentLayout` the way a
//! host would: events in, one frame per 16ms out.

use crate::hero::targets as hero_targets;
use crate::EntranceStep;
use crate::prelude::*;
use folio_animation::{Interpolate, VisualPatch};
use folio_layout::SpritePosition;
use std::cell::RefCell;
use std::rc::Rc;

const FRAME_MS: Millis = 16.0;

/// A 1440x1024 page, the stage's reference size
fn layout() -> DocumentLayout {
    let viewport = Size::new(1440.0, 1024.0);
    let mut doc = DocumentLayout::stacked(
        viewport,
        [
            ("about", 1024.0),
            ("experience", 1600.0),
            ("skills", 900.0),
            ("projects", 1400.0),
            ("contact", 800.0),
            ("footer", 300.0),
        ],
    );
    for i in 0..4 {
        let top = 1200.0 + i as f32 * 350.0;
        doc.set_element(format!("experience.card.{i}"), Rect::new(0.0, top, 1440.0, 300.0));
    }
    doc
}

/// Route tracing output through the test harness; `RUST_LOG` picks the level
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn mounted() -> (Page, DocumentLayout) {
    init_tracing();
    let mut page = Page::builtin().unwrap();
    let doc = layout();
    page.mount(&doc, 0.0);
    (page, doc)
}

/// Step frames from `from` until `until`, returning the time reached
fn run(page: &mut Page, doc: &mut DocumentLayout, from: Millis, until: Millis) -> Millis {
    let mut now = from;
    while now < until {
        now += FRAME_MS;
        page.step(now, doc);
    }
    now
}

#[test]
fn test_builtin_page_composes() {
    let page = Page::builtin().unwrap();
    assert!(!page.is_mounted());
    assert_eq!(page.reveals().all().len(), 10);
    assert_eq!(page.active_section(), "about");

    let targets = page.targets();
    assert!(targets.contains(&TargetId::from("header")));
    assert!(targets.contains(&TargetId::indexed(hero_targets::TITLE, 0)));
    assert!(targets.contains(&TargetId::from("projects.card.5.button")));
    assert!(targets.contains(&TargetId::from("footer")));
}

#[test]
fn test_unknown_stage_link_is_rejected() {
    let mut config = PageConfig::default();
    config.sections.retain(|id| id != "contact");
    let err = Page::new(PortfolioContent::builtin().unwrap(), config).err();
    assert!(matches!(err, Some(FolioError::UnknownSection(ref id)) if id == "contact"));
}

#[test]
fn test_mount_starts_entrances_once() {
    let (mut page, mut doc) = mounted();
    let timelines = page.scheduler().timeline_count();
    page.mount(&doc, 100.0);
    assert_eq!(page.scheduler().timeline_count(), timelines);

    let frame = page.step(FRAME_MS, &mut doc);
    assert!(frame.animating);
    assert!(frame.state("header").unwrap().opacity < 1.0);
    let letter = frame.state("hero.title.0").unwrap();
    assert_eq!(letter.opacity, 0.0);
    assert_eq!(frame.state("hero.sprite").unwrap().opacity, 0.0);

    // fragmented exactly once, 18 characters including the space
    assert_eq!(page.hero().title().tokens().len(), 18);
    assert_eq!(page.hero().title().fragmentation_passes(), 1);
}

#[test]
fn test_zero_length_entrance_completes_on_mount() {
    let mut config = PageConfig::default();
    let instant = EntranceStep::new(VisualPatch::new().opacity(0.0), 0.0);
    config.hero.initial_delay_ms = 0.0;
    config.hero.title = instant.clone();
    config.hero.subtitle = instant.clone();
    config.hero.tags = instant.clone();
    config.hero.image = instant.clone();
    config.hero.scroll_indicator = instant;
    config.hero.profile_fade_ms = 0.0;

    init_tracing();
    let mut page = Page::new(PortfolioContent::builtin().unwrap(), config).unwrap();
    page.mount(&layout(), 0.0);
    assert!(page.hero().is_entrance_complete());
}

#[test]
fn test_entrance_hands_over_to_character() {
    let (mut page, mut doc) = mounted();
    let now = run(&mut page, &mut doc, 0.0, 2800.0);

    assert!(page.hero().is_entrance_complete());
    let frame = page.step(now + FRAME_MS, &mut doc);
    assert!(frame.state("hero.image").unwrap().opacity < 1e-6);
    assert!((frame.state("hero.sprite").unwrap().opacity - 0.9).abs() < 1e-6);
    assert!(frame
        .state("header")
        .unwrap()
        .approx_eq(&VisualState::IDENTITY, 1e-4));
}

#[test]
fn test_pointer_drives_pose_and_idle_returns_front() {
    let (mut page, mut doc) = mounted();
    let now = run(&mut page, &mut doc, 0.0, 2800.0);

    // last x starts at 0, so the first move reads as moving right
    page.handle_event(&InputEvent::PointerMove { x: 900.0, y: 400.0 }, now, &doc);
    assert_eq!(page.pose(), Pose::Right);
    assert_eq!(page.sprite_position(now), SpritePosition::Pixels(900.0));

    page.handle_event(&InputEvent::PointerMove { x: 100.0, y: 400.0 }, now + 50.0, &doc);
    assert_eq!(page.pose(), Pose::Left);
    // clamped to the minimum stage x
    assert_eq!(page.sprite_position(now + 50.0), SpritePosition::Pixels(440.0));

    let frame = page.step(now + 300.0, &mut doc);
    assert_eq!(frame.pose, Pose::Front);
    assert!(frame.sprite.center().x >= 440.0);
}

#[test]
fn test_scroll_updates_active_section_and_signals() {
    let (mut page, mut doc) = mounted();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let active = page.header().active_signal();
    page.create_effect(move |g| {
        if let Some(id) = g.get(active) {
            sink.borrow_mut().push(id.to_string());
        }
    });

    // experience spans 1024..2624 and straddles the probe line
    doc.set_scroll_y(1000.0);
    page.handle_event(&InputEvent::Scroll { y: 1000.0 }, 100.0, &doc);
    assert_eq!(page.active_section(), "experience");
    assert!(page.is_scrolled());
    assert_eq!(*seen.borrow(), ["about", "experience"]);

    let active: Vec<_> = page
        .nav_items()
        .into_iter()
        .filter(|item| item.is_active)
        .map(|item| item.section)
        .collect();
    assert_eq!(active, [SectionId::from("experience")]);

    doc.set_scroll_y(0.0);
    page.handle_event(&InputEvent::Scroll { y: 0.0 }, 200.0, &doc);
    assert_eq!(page.active_section(), "about");
    assert!(!page.is_scrolled());
}

#[test]
fn test_wheel_scroll_reveals_sections() {
    let (mut page, mut doc) = mounted();
    let footer = page.step(FRAME_MS, &mut doc).state("footer").unwrap();
    assert_eq!(footer.y, 30.0);

    page.handle_event(&InputEvent::Wheel { delta_y: 4000.0 }, FRAME_MS, &doc);
    let now = run(&mut page, &mut doc, FRAME_MS, 4000.0);
    assert_eq!(doc.scroll_y(), 4000.0);

    let frame = page.step(now + FRAME_MS, &mut doc);
    assert_eq!(frame.scroll_y, 4000.0);
    assert_eq!(frame.active_section, "projects");
    assert!(!frame.animating);
    assert!(frame
        .state("skills.card.0")
        .unwrap()
        .approx_eq(&VisualState::IDENTITY, 1e-4));
    assert!(frame
        .state("experience.card.3")
        .unwrap()
        .approx_eq(&VisualState::IDENTITY, 1e-4));
    // footer starts at "top 90%": 5724 - 921.6
    assert_eq!(frame.state("footer").unwrap().y, 30.0);
}

#[test]
fn test_navigate_leaves_room_for_header() {
    let (mut page, mut doc) = mounted();
    assert!(page.navigate("projects", &doc));
    assert!(!page.navigate("blog", &doc));

    run(&mut page, &mut doc, 0.0, 300.0);
    assert_eq!(doc.scroll_y(), 3524.0 - 80.0);
    assert_eq!(page.active_section(), "projects");
}

#[test]
fn test_stage_click_scrolls_to_linked_section() {
    let (mut page, mut doc) = mounted();

    assert!(page.click(Point::new(5.0, 5.0), &doc).is_none());
    // the menu object has no link
    assert!(page.click(Point::new(923.0, 300.0), &doc).is_none());

    let section = page.click(Point::new(310.0, 308.0), &doc);
    assert_eq!(section, Some(SectionId::from("contact")));
    run(&mut page, &mut doc, 0.0, 1500.0);
    assert_eq!(doc.scroll_y(), 4924.0);
    assert_eq!(page.active_section(), "contact");
}

#[test]
fn test_scroll_hint_moves_one_viewport() {
    let (mut page, mut doc) = mounted();
    page.scroll_hint(doc.viewport());
    run(&mut page, &mut doc, 0.0, 1500.0);
    assert_eq!(doc.scroll_y(), 1024.0);
    assert_eq!(page.active_section(), "experience");
}

#[test]
fn test_native_scroll_ignored_during_smooth_scroll() {
    let (mut page, mut doc) = mounted();
    page.handle_event(&InputEvent::Wheel { delta_y: 2000.0 }, 0.0, &doc);
    run(&mut page, &mut doc, 0.0, 200.0);
    let mid = page.scroll().scroll();
    assert!(mid > 0.0 && mid < 2000.0);

    page.handle_event(&InputEvent::Scroll { y: 10.0 }, 200.0, &doc);
    assert_eq!(page.scroll().scroll(), mid);
}

#[test]
fn test_hover_reaches_frame_states() {
    let (mut page, mut doc) = mounted();
    let frame = page.step(FRAME_MS, &mut doc);
    assert_eq!(frame.state("projects.card.0.button").unwrap().opacity, 0.0);

    assert!(page.hover_enter("projects.card.0"));
    assert!(!page.hover_enter("skills.card.0"));
    let now = run(&mut page, &mut doc, FRAME_MS, 1000.0);
    let frame = page.step(now + FRAME_MS, &mut doc);
    assert_eq!(frame.state("projects.card.0.button").unwrap().opacity, 1.0);

    assert!(page.hover_leave("projects.card.0"));
    let now = run(&mut page, &mut doc, now, now + 1000.0);
    let frame = page.step(now + FRAME_MS, &mut doc);
    assert_eq!(frame.state("projects.card.0.button").unwrap().opacity, 0.0);
}

#[test]
fn test_hero_intersection_disables_tracking() {
    let (mut page, mut doc) = mounted();
    let now = run(&mut page, &mut doc, 0.0, 2800.0);

    let hidden = InputEvent::Intersection {
        target: "about".into(),
        ratio: 0.05,
    };
    page.handle_event(&hidden, now, &doc);
    page.handle_event(&InputEvent::PointerMove { x: 900.0, y: 0.0 }, now, &doc);
    assert_eq!(page.pose(), Pose::Front);

    // other elements do not affect the hero
    let other = InputEvent::Intersection {
        target: "skills".into(),
        ratio: 1.0,
    };
    page.handle_event(&other, now, &doc);
    page.handle_event(&InputEvent::PointerMove { x: 900.0, y: 0.0 }, now, &doc);
    assert_eq!(page.pose(), Pose::Front);
}

#[test]
fn test_resize_refits_stage() {
    let (mut page, mut doc) = mounted();
    let now = run(&mut page, &mut doc, 0.0, 100.0);
    let before = page.step(now + FRAME_MS, &mut doc).sprite;

    doc.resize(Size::new(2880.0, 2048.0));
    page.handle_event(
        &InputEvent::Resize {
            width: 2880.0,
            height: 2048.0,
        },
        now + FRAME_MS,
        &doc,
    );
    let after = page.step(now + 2.0 * FRAME_MS, &mut doc).sprite;
    assert!((after.width() - before.width() * 2.0).abs() < 1e-3);
}
