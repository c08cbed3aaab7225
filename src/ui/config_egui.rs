use crate::prelude::*;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

pub struct ConfigEguiPlugin;

impl Plugin for ConfigEguiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GalaxyConfigUi>()
            .add_systems(Startup, configure_visuals_system)
            .add_systems(Update, ui_system);
    }
}

/// Panel-side copy of the parameters. Edits land here first and are committed
/// to `GalaxyConfig` once the pointer lets go and no text field is being typed into.
#[derive(Resource)]
struct GalaxyConfigUi {
    draft: GalaxyParams,
    dirty: bool,
    preset_name: String,
}

impl Default for GalaxyConfigUi {
    fn default() -> Self {
        Self {
            draft: GalaxyParams::default(),
            dirty: false,
            preset_name: "default".to_string(),
        }
    }
}

fn configure_visuals_system(mut contexts: EguiContexts) {
    contexts.ctx_mut().set_visuals(egui::Visuals {
        window_corner_radius: 0.0.into(),
        ..Default::default()
    });
}

// egui's rgb picker works in linear space
fn to_picker(color: Srgba) -> [f32; 3] {
    let linear = LinearRgba::from(color);
    [linear.red, linear.green, linear.blue]
}

fn from_picker(rgb: [f32; 3]) -> Srgba {
    Srgba::from(LinearRgba::rgb(rgb[0], rgb[1], rgb[2]))
}

fn color_ui(color: &mut Srgba, label: &str, ui: &mut egui::Ui) -> egui::Response {
    let mut rgb = to_picker(*color);
    let response = ui
        .horizontal(|ui| {
            let response = ui.color_edit_button_rgb(&mut rgb);
            ui.label(label);
            response
        })
        .inner;
    if response.changed() {
        *color = from_picker(rgb);
    }
    response
}

fn params_ui(params: &mut GalaxyParams, ui: &mut egui::Ui) -> bool {
    let minval = GalaxyParams::MIN;
    let maxval = GalaxyParams::MAX;

    let responses = [
        ui.add(
            egui::Slider::new(&mut params.count, minval.count..=maxval.count)
                .step_by(100.0)
                .text("Particle No."),
        ),
        ui.add(
            egui::Slider::new(&mut params.size, minval.size..=maxval.size)
                .step_by(0.001)
                .text("Particle size"),
        ),
        ui.add(
            egui::Slider::new(&mut params.radius, minval.radius..=maxval.radius)
                .step_by(0.01)
                .text("Galaxy Radius"),
        ),
        ui.add(
            egui::Slider::new(&mut params.branches, minval.branches..=maxval.branches)
                .text("Galaxy Branches"),
        ),
        ui.add(
            egui::Slider::new(&mut params.spin, minval.spin..=maxval.spin)
                .step_by(0.01)
                .text("Branch Spin"),
        ),
        ui.add(
            egui::Slider::new(
                &mut params.randomness,
                minval.randomness..=maxval.randomness,
            )
            .step_by(0.001)
            .text("Branch Randomness"),
        ),
        ui.add(
            egui::Slider::new(
                &mut params.randomness_power,
                minval.randomness_power..=maxval.randomness_power,
            )
            .step_by(0.1)
            .text("Branch Randomness Power"),
        ),
        color_ui(&mut params.inside_color, "Core Color", ui),
        color_ui(&mut params.outside_color, "Trail Color", ui),
    ];

    responses.iter().any(|r| r.changed())
}

/// Pushes the draft into the config. A rejected draft is reset so the panel
/// shows what is actually on screen.
fn commit_draft(galaxy_ui_config: &mut GalaxyConfigUi, galaxy_config: &mut GalaxyConfig) {
    if let Err(e) = galaxy_config.commit(galaxy_ui_config.draft.clone()) {
        warn!("Rejected galaxy edit: {}", e);
        galaxy_ui_config.draft = galaxy_config.params.clone();
    }
}

/// Commits a dirty draft once the edit is over. Returns whether a commit was attempted.
fn end_of_edit(
    galaxy_ui_config: &mut GalaxyConfigUi,
    galaxy_config: &mut GalaxyConfig,
    pointer_down: bool,
    typing: bool,
) -> bool {
    if !galaxy_ui_config.dirty || pointer_down || typing {
        return false;
    }
    galaxy_ui_config.dirty = false;
    commit_draft(galaxy_ui_config, galaxy_config);
    true
}

fn ui_system(
    mut contexts: EguiContexts,
    mut galaxy_ui_config: ResMut<GalaxyConfigUi>,
    mut galaxy_config: ResMut<GalaxyConfig>,
    mut presets: ResMut<PresetStore>,
    point_count: Res<PointCount>,
) {
    let ctx = contexts.ctx_mut();
    let galaxy_ui_config = &mut *galaxy_ui_config;

    egui::SidePanel::left("side_panel")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Galaxy");

            if params_ui(&mut galaxy_ui_config.draft, ui) {
                galaxy_ui_config.dirty = true;
            }
            ui.separator();

            egui::CollapsingHeader::new("Presets")
                .default_open(true)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Name");
                        ui.text_edit_singleline(&mut galaxy_ui_config.preset_name);
                    });
                    let name = galaxy_ui_config.preset_name.trim().to_string();

                    ui.horizontal(|ui| {
                        if ui
                            .add_enabled(!name.is_empty(), egui::Button::new("Save preset"))
                            .clicked()
                        {
                            presets.save(&name, &galaxy_config.params);
                        }
                        if ui
                            .add_enabled(presets.contains(&name), egui::Button::new("Load preset"))
                            .clicked()
                        {
                            if let Some(params) = presets.get(&name) {
                                info!("Loading galaxy preset \"{}\"", name);
                                galaxy_ui_config.draft = params.clone();
                                galaxy_ui_config.dirty = true;
                            }
                        }
                    });

                    let mut picked = None;
                    for saved in presets.names() {
                        if ui.selectable_label(saved == name, saved).clicked() {
                            picked = Some(saved.to_string());
                        }
                    }
                    if let Some(picked) = picked {
                        galaxy_ui_config.preset_name = picked;
                    }
                });
            ui.separator();

            ui.label(format!("Generation: {}", galaxy_config.generation));
            ui.label(format!("Points: {}", point_count.count));
        });

    // slider number boxes update the draft on every keystroke
    let pointer_down = ctx.input(|i| i.pointer.any_down());
    let typing = ctx.wants_keyboard_input();
    end_of_edit(galaxy_ui_config, &mut galaxy_config, pointer_down, typing);
}
