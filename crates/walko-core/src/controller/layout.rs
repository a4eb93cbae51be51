//! Builds mount specs from content definitions and computed geometry.

use walko_config::RenderConfig;
use walko_protocols::{
    BeaconMount, ButtonAction, CardButton, CardKind, CardMount, ElementRect, HighlightMount,
    NodeId, Placement, Position, TooltipDefinition, TourDefinition, TourStep, Viewport,
};

use crate::geometry::{
    beacon_position, card_position, centered_position, tour_tooltip_position, BeaconAnchor,
    CardLayout, TOUR_TOOLTIP_ESTIMATED_HEIGHT, TOUR_TOOLTIP_WIDTH,
};
use crate::personalize::Personalizer;

const LABEL_BACK: &str = "Back";
const LABEL_NEXT: &str = "Next";
const LABEL_FINISH: &str = "Finish";
const LABEL_SKIP: &str = "Skip";
const LABEL_DISMISS: &str = "Got it";

/// Buttons for step `index` of `count`, allocating a node per button.
pub(crate) fn step_buttons(
    step: &TourStep,
    index: usize,
    count: usize,
    personalizer: &Personalizer,
    mut allocate: impl FnMut(ButtonAction) -> NodeId,
) -> Vec<CardButton> {
    let last = index + 1 >= count;
    let mut buttons = Vec::with_capacity(3);

    if index > 0 {
        buttons.push(CardButton {
            node: allocate(ButtonAction::Prev),
            label: LABEL_BACK.to_string(),
            action: ButtonAction::Prev,
            primary: false,
        });
    }

    let (action, fallback) = if last {
        (ButtonAction::Finish, LABEL_FINISH)
    } else {
        (ButtonAction::Next, LABEL_NEXT)
    };
    let label = step
        .button_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| personalizer.apply(t))
        .unwrap_or_else(|| fallback.to_string());
    buttons.push(CardButton {
        node: allocate(action),
        label,
        action,
        primary: true,
    });

    buttons.push(CardButton {
        node: allocate(ButtonAction::Skip),
        label: LABEL_SKIP.to_string(),
        action: ButtonAction::Skip,
        primary: false,
    });

    buttons
}

/// Where a step card goes: next to its anchor, or centered.
pub(crate) fn step_position(
    anchor: Option<&ElementRect>,
    placement: Placement,
    viewport: Viewport,
    render: &RenderConfig,
) -> Position {
    match anchor {
        Some(rect) => tour_tooltip_position(rect, placement, viewport),
        None => centered_position(
            TOUR_TOOLTIP_WIDTH,
            TOUR_TOOLTIP_ESTIMATED_HEIGHT,
            viewport,
            render.viewport_margin,
        ),
    }
}

pub(crate) struct StepCard<'a> {
    pub tour: &'a TourDefinition,
    pub step: &'a TourStep,
    pub index: usize,
    pub count: usize,
    pub position: Position,
    pub centered: bool,
    pub buttons: Vec<CardButton>,
}

pub(crate) fn step_card(
    card: StepCard<'_>,
    render: &RenderConfig,
    personalizer: &Personalizer,
) -> CardMount {
    let style = &card.tour.style;
    CardMount {
        content_id: card.tour.id.clone(),
        kind: CardKind::TourStep {
            step_index: card.index,
            step_count: card.count,
        },
        title: personalizer.apply(&card.step.title),
        body: personalizer.apply(&card.step.content),
        image_url: card.step.image_url.clone(),
        buttons: card.buttons,
        position: card.position,
        width: TOUR_TOOLTIP_WIDTH,
        padding: style.padding,
        border_radius: style.border_radius,
        shadow: style.shadow,
        background_color: style.background_color.clone(),
        text_color: style.text_color.clone(),
        button_color: Some(style.button_color.clone()),
        button_text_color: Some(style.button_text_color.clone()),
        font_size: None,
        font_family: None,
        z_index: step_z_index(card.step, render) + 1,
        centered: card.centered,
    }
}

pub(crate) fn step_highlight(
    tour_id: &str,
    step: &TourStep,
    rect: ElementRect,
    render: &RenderConfig,
) -> HighlightMount {
    HighlightMount {
        content_id: tour_id.to_string(),
        rect,
        pulsing: step.pulse_enabled,
        z_index: step_z_index(step, render),
    }
}

fn step_z_index(step: &TourStep, render: &RenderConfig) -> i64 {
    step.z_index.unwrap_or(render.default_z_index)
}

fn tooltip_z_index(tooltip: &TooltipDefinition, render: &RenderConfig) -> i64 {
    tooltip.z_index.unwrap_or(render.default_z_index)
}

pub(crate) fn beacon_mount(
    tooltip: &TooltipDefinition,
    rect: &ElementRect,
    render: &RenderConfig,
) -> BeaconMount {
    let beacon = &tooltip.beacon;
    BeaconMount {
        content_id: tooltip.id.clone(),
        shape: beacon.icon_shape,
        color: beacon.color.clone(),
        size: beacon.size,
        pulsing: beacon.pulsing,
        position: beacon_position(rect, &BeaconAnchor::from(beacon)),
        z_index: tooltip_z_index(tooltip, render),
    }
}

pub(crate) fn tooltip_card_position(
    tooltip: &TooltipDefinition,
    beacon: Position,
    viewport: Viewport,
    render: &RenderConfig,
) -> Position {
    let layout = CardLayout::from_style(
        &tooltip.card,
        render.estimated_card_height,
        render.viewport_margin,
    );
    card_position(beacon, tooltip.beacon.edge, tooltip.beacon.size, &layout, viewport)
}

/// The dismiss button for `button`-dismissed tooltips; other modes have none.
pub(crate) fn tooltip_buttons(
    tooltip: &TooltipDefinition,
    personalizer: &Personalizer,
    allocate: impl FnOnce() -> NodeId,
) -> Vec<CardButton> {
    if tooltip.dismiss != walko_protocols::DismissKind::Button {
        return Vec::new();
    }
    let label = tooltip
        .button_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| personalizer.apply(t))
        .unwrap_or_else(|| LABEL_DISMISS.to_string());
    vec![CardButton {
        node: allocate(),
        label,
        action: ButtonAction::Dismiss,
        primary: true,
    }]
}

pub(crate) fn tooltip_card(
    tooltip: &TooltipDefinition,
    position: Position,
    buttons: Vec<CardButton>,
    render: &RenderConfig,
    personalizer: &Personalizer,
) -> CardMount {
    let card = &tooltip.card;
    CardMount {
        content_id: tooltip.id.clone(),
        kind: CardKind::Tooltip,
        title: personalizer.apply(&tooltip.title),
        body: personalizer.apply(&tooltip.content),
        image_url: tooltip.image_url.clone(),
        buttons,
        position,
        width: card.width,
        padding: card.padding,
        border_radius: card.border_radius,
        shadow: card.shadow,
        background_color: card.background_color.clone(),
        text_color: card.text_color.clone(),
        button_color: Some(tooltip.beacon.color.clone()),
        button_text_color: None,
        font_size: Some(card.font_size),
        font_family: card.font_family.clone(),
        z_index: tooltip_z_index(tooltip, render) + 1,
        centered: false,
    }
}

/// Screen area a tooltip card is assumed to cover.
pub(crate) fn card_area(card: &CardMount, render: &RenderConfig) -> ElementRect {
    card.position.with_size(card.width, render.estimated_card_height)
}
