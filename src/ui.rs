use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use egui_extras::{Column, TableBuilder};

use crate::bodies::CelestialBody;
use crate::camera::{ActiveView, CameraCommand, CameraState, FocusChanged, ViewCamera};
use crate::catalog::{CatalogLoadState, CurrentSystem, SystemCatalog};
use crate::orbits::SimClock;

#[derive(States, Default, Debug, Clone, Eq, PartialEq, Hash)]
pub enum ViewState {
    #[default]
    SystemSelect,
    Viewing,
}

pub fn system_select_ui(
    mut contexts: EguiContexts,
    catalog: Option<Res<SystemCatalog>>,
    load_state: Res<State<CatalogLoadState>>,
    mut commands: Commands,
    mut next: ResMut<NextState<ViewState>>,
    mut exit: EventWriter<AppExit>,
) {
    egui::CentralPanel::default().show(contexts.ctx_mut(), |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("Orrery");
            ui.label("Pick a star system to view");
            ui.add_space(20.0);

            if matches!(load_state.get(), CatalogLoadState::Loading) {
                ui.spinner();
                return;
            }
            let Some(catalog) = catalog.as_ref() else {
                return;
            };

            for (slot, name) in &catalog.available {
                if ui.button(name).clicked() {
                    if let Some(config) = catalog.get_system(*slot) {
                        commands.insert_resource(CurrentSystem { config });
                        next.set(ViewState::Viewing);
                    }
                }
            }

            ui.add_space(20.0);
            if ui.button("Exit").clicked() {
                exit.send(AppExit::Success);
            }
        });
    });
}

pub fn viewer_ui(
    mut contexts: EguiContexts,
    active: Res<ActiveView>,
    mut clock: ResMut<SimClock>,
    current: Res<CurrentSystem>,
    bodies: Query<&CelestialBody>,
    cameras: Query<(&CameraState, &Transform), With<ViewCamera>>,
    mut camera_commands: EventWriter<CameraCommand>,
    mut next: ResMut<NextState<ViewState>>,
) {
    let Some(view) = active.0 else {
        return;
    };
    let Ok((state, transform)) = cameras.get(view) else {
        return;
    };

    // Top menu bar with sim and camera controls
    egui::TopBottomPanel::top("menu_bar").show(contexts.ctx_mut(), |ui| {
        egui::menu::bar(ui, |ui| {
            if ui.button("System Select").clicked() {
                next.set(ViewState::SystemSelect);
            }
            ui.separator();
            ui.label(&current.config.name);
            ui.separator();

            let pause_label = if clock.paused { "Resume" } else { "Pause" };
            if ui.button(pause_label).clicked() {
                clock.paused = !clock.paused;
            }
            ui.add(
                egui::Slider::new(&mut clock.speed, 0.1..=1000.0)
                    .logarithmic(true)
                    .text("days/s"),
            );
            ui.separator();

            if ui.button("Reset View").clicked() {
                camera_commands.send(CameraCommand::reset_view(view));
            }
            if ui.button("Clear Focus").clicked() {
                camera_commands.send(CameraCommand::clear_focus(view));
            }
            if ui.button("Face Origin").clicked() {
                camera_commands.send(CameraCommand::PointAt {
                    view,
                    position: Vec3::ZERO,
                });
            }

            let mut fov = state.fov;
            if ui
                .add(egui::Slider::new(&mut fov, 20.0..=120.0).text("FOV"))
                .changed()
            {
                camera_commands.send(CameraCommand::SetFov { view, degrees: fov });
            }
        });
    });

    // Right panel: the focus list
    egui::SidePanel::right("bodies_panel")
        .default_width(320.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Bodies");
            ui.label(&current.config.description);
            ui.add_space(8.0);

            let mut rows: Vec<&CelestialBody> = bodies.iter().collect();
            rows.sort_by(|a, b| a.id.0.cmp(&b.id.0));

            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(90.0))
                .column(Column::auto().at_least(50.0))
                .column(Column::remainder())
                .header(18.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Name");
                    });
                    header.col(|ui| {
                        ui.strong("Kind");
                    });
                    header.col(|ui| {
                        ui.strong("Camera");
                    });
                })
                .body(|mut table| {
                    for body in rows {
                        table.row(20.0, |mut row| {
                            row.col(|ui| {
                                let mut text = egui::RichText::new(&body.id.0);
                                if state.followed.as_ref() == Some(&body.id) {
                                    text = text.color(egui::Color32::LIGHT_GREEN);
                                } else if state.focused.as_ref() == Some(&body.id) {
                                    text = text.color(egui::Color32::YELLOW);
                                }
                                ui.label(text);
                            });
                            row.col(|ui| {
                                ui.label(format!("{:?}", body.kind));
                            });
                            row.col(|ui| {
                                ui.horizontal(|ui| {
                                    if ui.small_button("Go").clicked() {
                                        camera_commands.send(CameraCommand::MoveTo {
                                            view,
                                            body: body.id.clone(),
                                            distance_factor: None,
                                        });
                                    }
                                    if ui.small_button("Follow").clicked() {
                                        camera_commands.send(CameraCommand::Follow {
                                            view,
                                            body: Some(body.id.clone()),
                                            distance_factor: None,
                                        });
                                    }
                                    if ui.small_button("Look").clicked() {
                                        camera_commands.send(CameraCommand::LookAt {
                                            view,
                                            body: body.id.clone(),
                                        });
                                    }
                                });
                            });
                        });
                    }
                });
        });

    // Bottom telemetry strip
    egui::TopBottomPanel::bottom("telemetry")
        .min_height(70.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Camera:");
                    let p = transform.translation;
                    ui.label(format!("X: {:.1}  Y: {:.1}  Z: {:.1}", p.x, p.y, p.z));
                });
                ui.add_space(20.0);

                ui.vertical(|ui| {
                    ui.label("Target:");
                    let t = state.target;
                    ui.label(format!("X: {:.1}  Y: {:.1}  Z: {:.1}", t.x, t.y, t.z));
                });
                ui.add_space(20.0);

                ui.vertical(|ui| {
                    ui.label(format!("FOV: {:.0} deg", state.fov));
                    ui.label(format!("t = {:.1} d", clock.elapsed));
                });
                ui.add_space(20.0);

                ui.vertical(|ui| {
                    let focused = state
                        .focused
                        .as_ref()
                        .map(|id| id.0.as_str())
                        .unwrap_or("none");
                    let followed = state
                        .followed
                        .as_ref()
                        .map(|id| id.0.as_str())
                        .unwrap_or("none");
                    ui.label(format!("Focused: {focused}"));
                    ui.label(format!("Following: {followed}"));
                });
            });
        });
}

pub fn announce_focus_changes(mut events: EventReader<FocusChanged>) {
    for event in events.read() {
        match &event.body {
            Some(id) => info!("focus changed to {id}"),
            None => info!("focus cleared"),
        }
    }
}
