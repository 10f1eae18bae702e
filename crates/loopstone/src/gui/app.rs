use crate::events::AppEvent;
use crate::gui::flight::Flight;
use crate::gui::ring::view::{TextureCache, draw_bead_face};
use crate::gui::ring::{self, State, TOAST_MS, layout};
use crate::gui::selector::Selector;
use crate::gui::theme::{self, ThemeColors};
use beadstock::catalog::{self, ProductId};
use beadstock::design::{BeadId, DesignStore, PlacedBead};
use beadstock::geom::Point;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

pub struct AppModel {
    pub state: Rc<RefCell<State>>,
    pub textures: Rc<RefCell<TextureCache>>,
    pub flight: Rc<RefCell<Option<Flight>>>,
    pub toast: Option<String>,
    pub store: DesignStore,
    pub overlay: gtk::Overlay,
    pub canvas: gtk::DrawingArea,
    pub flight_layer: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    DragBegin(Point),
    DragMove(Point),
    DragEnd,
    PointerLeft,
    Save,
    Clear,
    Remove(BeadId),
    Reorder { from: usize, to: usize },
    Rotate(f64),
    ProductPicked(ProductId, Point),
    FlightDone,
    ToastExpired,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Save => AppMsg::Save,
            AppEvent::Clear => AppMsg::Clear,
            AppEvent::Remove(id) => AppMsg::Remove(id),
            AppEvent::Reorder { from, to } => AppMsg::Reorder { from, to },
            AppEvent::Rotate(deg) => AppMsg::Rotate(deg),
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (State, DesignStore, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Loopstone"),
            set_default_size: (480, 860),
            add_css_class: "loopstone-window",

            #[name = "overlay"]
            gtk::Overlay {
                #[name = "content"]
                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,

                    gtk::Box {
                        set_orientation: gtk::Orientation::Horizontal,
                        set_spacing: 8,
                        set_margin_top: 12,
                        set_margin_start: 12,
                        set_margin_end: 12,

                        gtk::Button {
                            set_icon_name: "user-trash-symbolic",
                            set_tooltip_text: Some("Clear All"),
                            connect_clicked[sender] => move |_| {
                                sender.input(AppMsg::Clear);
                            }
                        },

                        gtk::Button {
                            set_label: "Save",
                            add_css_class: "suggested-action",
                            connect_clicked[sender] => move |_| {
                                sender.input(AppMsg::Save);
                            }
                        },
                    },

                    #[name = "canvas"]
                    gtk::DrawingArea {
                        set_hexpand: true,
                        set_vexpand: true,
                        add_css_class: "loopstone-canvas",

                        add_controller = gtk::GestureDrag {
                            connect_drag_begin[sender] => move |_, x, y| {
                                sender.input(AppMsg::DragBegin(Point::new(x, y)));
                            },
                            connect_drag_update[sender] => move |gesture, dx, dy| {
                                if let Some((sx, sy)) = gesture.start_point() {
                                    sender.input(AppMsg::DragMove(Point::new(sx + dx, sy + dy)));
                                }
                            },
                            connect_drag_end[sender] => move |_, _, _| {
                                sender.input(AppMsg::DragEnd);
                            }
                        },

                        add_controller = gtk::EventControllerMotion {
                            connect_leave[sender] => move |_| {
                                sender.input(AppMsg::PointerLeft);
                            }
                        },
                    },
                },

                add_overlay = &gtk::Label {
                    add_css_class: "loopstone-toast",
                    set_halign: gtk::Align::Center,
                    set_valign: gtk::Align::Start,
                    set_margin_top: 64,
                    #[watch]
                    set_visible: model.toast.is_some(),
                    #[watch]
                    set_label: model.toast.as_deref().unwrap_or(""),
                },
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (state, store, rx) = init;

        theme::load_css();

        let model = AppModel {
            state: Rc::new(RefCell::new(state)),
            textures: Rc::new(RefCell::new(TextureCache::default())),
            flight: Rc::new(RefCell::new(None)),
            toast: None,
            store,
            overlay: gtk::Overlay::default(),
            canvas: gtk::DrawingArea::default(),
            flight_layer: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.canvas = widgets.canvas.clone();
        model.overlay = widgets.overlay.clone();

        let selector = Selector::new(
            sender.input_sender().clone(),
            widgets.overlay.clone().upcast(),
        );
        widgets.content.append(&selector.root);

        // The flight layer sits over everything and never takes input.
        model.flight_layer.set_can_target(false);
        widgets.overlay.add_overlay(&model.flight_layer);

        let state_draw = model.state.clone();
        let textures_draw = model.textures.clone();
        widgets.canvas.set_draw_func(move |area, cr, width, height| {
            let colors = ThemeColors::from_context(&area.style_context());
            let center = Point::new(width as f64 / 2.0, height as f64 / 2.0);
            if let Err(e) = ring::view::draw(
                cr,
                &state_draw.borrow(),
                &mut textures_draw.borrow_mut(),
                &colors,
                center,
            ) {
                log::error!("Drawing error: {}", e);
            }
        });

        let flight_draw = model.flight.clone();
        let state_ref = model.state.clone();
        let textures_ref = model.textures.clone();
        model.flight_layer.set_draw_func(move |area, cr, _, _| {
            let flight = flight_draw.borrow();
            let Some(f) = flight.as_ref() else { return };

            let colors = ThemeColors::from_context(&area.style_context());
            let radius = state_ref.borrow().metrics.bead_radius(f.product.size_mm);
            let texture = textures_ref.borrow_mut().get(&f.product.id, &f.product.finish);
            let at = f.position();

            cr.translate(at.x, at.y);
            cr.rotate(f.rotation_deg().to_radians());
            cr.scale(f.scale(), f.scale());
            if let Err(e) =
                draw_bead_face(cr, &f.product.finish, texture.as_ref(), radius, f.alpha(), &colors)
            {
                log::error!("Drawing error: {}", e);
            }
        });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::DragBegin(pointer) => {
                let center = self.canvas_center();
                self.state.borrow_mut().begin_gesture(center, pointer);
                self.canvas.queue_draw();
            }
            AppMsg::DragMove(pointer) => {
                self.state.borrow_mut().move_gesture(pointer);
                self.canvas.queue_draw();
            }
            AppMsg::DragEnd => {
                self.state.borrow_mut().end_gesture();
                self.canvas.queue_draw();
            }
            AppMsg::PointerLeft => {
                // A lost pointer finalizes exactly like a release.
                let mut state = self.state.borrow_mut();
                if state.controller.is_active() {
                    state.end_gesture();
                    drop(state);
                    self.canvas.queue_draw();
                }
            }
            AppMsg::Save => {
                let notice = ring::model::save_design(&self.state.borrow().beads, &self.store);
                self.show_toast(notice, &sender);
            }
            AppMsg::Clear => {
                let notice = ring::model::clear_design(&mut self.state.borrow_mut(), &self.store);
                self.show_toast(notice, &sender);
                self.canvas.queue_draw();
            }
            AppMsg::Remove(id) => {
                self.state.borrow_mut().remove(&id);
                self.canvas.queue_draw();
            }
            AppMsg::Reorder { from, to } => {
                self.state.borrow_mut().reorder(from, to);
                self.canvas.queue_draw();
            }
            AppMsg::Rotate(delta_deg) => {
                self.state.borrow_mut().rotate_by(delta_deg);
                self.canvas.queue_draw();
            }
            AppMsg::ProductPicked(id, start) => {
                if self.flight.borrow().is_some() {
                    return;
                }
                let Some(product) = catalog::find_product(&id) else {
                    log::warn!("Selected unknown product {}", id);
                    return;
                };

                let (to, rotation_deg) = {
                    let state = self.state.borrow();
                    let (offset, rotation_deg) = layout::flight_target(
                        &state.metrics,
                        state.beads.len(),
                        state.rotation_deg,
                    );
                    (self.canvas_center_in_overlay().translated(offset), rotation_deg)
                };

                *self.flight.borrow_mut() = Some(Flight::new(product, start, to, rotation_deg));
                {
                    let mut state = self.state.borrow_mut();
                    state.insertion_pending = true;
                    state.relayout();
                }
                self.start_flight_clock(&sender);
                self.canvas.queue_draw();
            }
            AppMsg::FlightDone => {
                if let Some(flight) = self.flight.borrow_mut().take() {
                    let mut state = self.state.borrow_mut();
                    state.insertion_pending = false;
                    state.push(PlacedBead::new(flight.product, BeadId::generate()));
                }
                self.flight_layer.queue_draw();
                self.canvas.queue_draw();
            }
            AppMsg::ToastExpired => {
                self.toast = None;
            }
            AppMsg::ConfigReload => match crate::config::load_config() {
                Ok(new_config) => {
                    let mut state = self.state.borrow_mut();
                    state.metrics = new_config.ring.into();
                    state.relayout();
                    drop(state);
                    self.canvas.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    fn canvas_center(&self) -> Point {
        Point::new(
            self.canvas.width() as f64 / 2.0,
            self.canvas.height() as f64 / 2.0,
        )
    }

    /// Canvas center expressed in the overlay's (flight layer's) coordinates.
    fn canvas_center_in_overlay(&self) -> Point {
        let center = self.canvas_center();
        self.canvas
            .translate_coordinates(&self.overlay, center.x, center.y)
            .map(|(x, y)| Point::new(x, y))
            .unwrap_or(center)
    }

    fn show_toast(&mut self, message: impl Into<String>, sender: &ComponentSender<Self>) {
        self.toast = Some(message.into());
        let sender = sender.clone();
        glib::timeout_add_local_once(Duration::from_millis(TOAST_MS), move || {
            sender.input(AppMsg::ToastExpired);
        });
    }

    fn start_flight_clock(&self, sender: &ComponentSender<Self>) {
        let flight = self.flight.clone();
        let sender = sender.clone();
        let last_frame = Cell::new(None::<i64>);
        self.flight_layer.add_tick_callback(move |layer, clock| {
            let now = clock.frame_time();
            let dt_ms = match last_frame.replace(Some(now)) {
                Some(prev) => (now - prev) as f64 / 1000.0,
                None => 0.0,
            };

            let done = match flight.borrow_mut().as_mut() {
                Some(f) => f.advance(dt_ms),
                None => return glib::ControlFlow::Break,
            };

            layer.queue_draw();
            if done {
                sender.input(AppMsg::FlightDone);
                return glib::ControlFlow::Break;
            }
            glib::ControlFlow::Continue
        });
    }
}
