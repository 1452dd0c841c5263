use egui::Context;

use crate::controller::{LookLock, Sandbox};
use crate::view::UiFrame;

/// Build the HUD for one frame and tessellate it for the renderer.
pub fn build_ui(egui_ctx: &Context, raw_input: egui::RawInput, sandbox: &Sandbox) -> (UiFrame, egui::PlatformOutput) {
    let full_output = egui_ctx.run(raw_input, |ctx| {
        draw_crosshair(ctx);
        draw_info_window(ctx, sandbox);
    });

    let pixels_per_point = full_output.pixels_per_point;
    let primitives = egui_ctx.tessellate(full_output.shapes, pixels_per_point);
    (
        UiFrame { primitives, textures_delta: full_output.textures_delta, pixels_per_point },
        full_output.platform_output,
    )
}

/// Marks the screen centre, where block edits are aimed.
fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::TOP, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 10.0;
    let stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
    painter.line_segment(
        [egui::Pos2::new(center.x - size, center.y), egui::Pos2::new(center.x + size, center.y)],
        stroke,
    );
    painter.line_segment(
        [egui::Pos2::new(center.x, center.y - size), egui::Pos2::new(center.x, center.y + size)],
        stroke,
    );
}

fn draw_info_window(ctx: &Context, sandbox: &Sandbox) {
    let eye = sandbox.camera.eye;
    let lock = match sandbox.look_lock() {
        LookLock::Locked => "locked",
        LookLock::Unlocked => "click to look around",
    };

    egui::Window::new("blockbox")
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("Blocks: {}", sandbox.world.len())).small());
            ui.label(egui::RichText::new(format!("Pos: x: {:.1} y: {:.1} z: {:.1}", eye.x, eye.y, eye.z)).small());
            ui.label(egui::RichText::new(format!("Mouse: {lock}")).small());
            ui.separator();
            ui.label(egui::RichText::new("WASD - Move").small());
            ui.label(egui::RichText::new("Left click - Remove block").small());
            ui.label(egui::RichText::new("Right click - Place grass").small());
            ui.label(egui::RichText::new("Esc - Release mouse").small());
        });
}
