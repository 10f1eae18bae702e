use crate::gui::app::AppMsg;
use crate::gui::ring::view::draw_bead_face;
use crate::gui::theme::ThemeColors;
use beadstock::catalog::{self, BeadProduct, CategoryId};
use beadstock::geom::Point;
use gtk::prelude::*;
use gtk4 as gtk;

const PANEL_HEIGHT: i32 = 320;
const CATEGORY_WIDTH: i32 = 110;
const CARD_FACE: i32 = 64;

/// The catalog browsing panel: category column on the left, product grid on
/// the right. Picking a product reports its id plus the card's center, which
/// becomes the entrance flight's launch point.
pub struct Selector {
    pub root: gtk::Box,
}

impl Selector {
    /// `reference` is the widget whose coordinate space the reported launch
    /// points use; the app passes the overlay hosting the flight layer.
    pub fn new(sender: relm4::Sender<AppMsg>, reference: gtk::Widget) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Horizontal, 0);
        root.add_css_class("loopstone-selector");
        root.set_height_request(PANEL_HEIGHT);

        let categories = catalog::categories();

        let list = gtk::ListBox::new();
        list.set_width_request(CATEGORY_WIDTH);
        for category in &categories {
            let label = gtk::Label::new(Some(&category.label));
            label.add_css_class("loopstone-category");
            label.set_wrap(true);
            list.append(&label);
        }

        let flow = gtk::FlowBox::new();
        flow.set_selection_mode(gtk::SelectionMode::None);
        flow.set_min_children_per_line(3);
        flow.set_max_children_per_line(3);
        flow.set_column_spacing(12);
        flow.set_row_spacing(12);
        flow.set_margin_top(12);
        flow.set_margin_bottom(12);
        flow.set_margin_start(12);
        flow.set_margin_end(12);
        flow.set_valign(gtk::Align::Start);

        let scroller = gtk::ScrolledWindow::new();
        scroller.set_hexpand(true);
        scroller.set_policy(gtk::PolicyType::Never, gtk::PolicyType::Automatic);
        scroller.set_child(Some(&flow));

        {
            let flow = flow.clone();
            let sender = sender.clone();
            let reference = reference.clone();
            list.connect_row_selected(move |_, row| {
                if let Some(row) = row {
                    let index = row.index().max(0) as usize;
                    if let Some(category) = categories.get(index) {
                        populate(&flow, &category.id, &sender, &reference);
                    }
                }
            });
        }
        if let Some(first) = list.row_at_index(0) {
            list.select_row(Some(&first));
        }

        root.append(&list);
        root.append(&scroller);

        Self { root }
    }
}

fn populate(
    flow: &gtk::FlowBox,
    category: &CategoryId,
    sender: &relm4::Sender<AppMsg>,
    reference: &gtk::Widget,
) {
    while let Some(child) = flow.first_child() {
        flow.remove(&child);
    }
    for product in catalog::products_in(category) {
        flow.insert(&product_card(product, sender.clone(), reference.clone()), -1);
    }
}

fn product_card(
    product: BeadProduct,
    sender: relm4::Sender<AppMsg>,
    reference: gtk::Widget,
) -> gtk::Button {
    let face = gtk::DrawingArea::new();
    face.set_content_width(CARD_FACE);
    face.set_content_height(CARD_FACE);
    {
        let finish = product.finish.clone();
        face.set_draw_func(move |area, cr, width, height| {
            let colors = ThemeColors::from_context(&area.style_context());
            cr.translate(width as f64 / 2.0, height as f64 / 2.0);
            let radius = (width.min(height) as f64 / 2.0 - 4.0).max(1.0);
            if let Err(e) = draw_bead_face(cr, &finish, None, radius, 1.0, &colors) {
                log::error!("Drawing error: {}", e);
            }
        });
    }

    let name = gtk::Label::new(Some(product.name.as_str()));
    name.add_css_class("loopstone-product-name");
    name.set_ellipsize(gtk::pango::EllipsizeMode::End);

    let price = gtk::Label::new(Some(&format!("{}mm - ¥{}", product.size_mm, product.price)));
    price.add_css_class("loopstone-product-price");

    let column = gtk::Box::new(gtk::Orientation::Vertical, 4);
    column.append(&face);
    column.append(&name);
    column.append(&price);

    let button = gtk::Button::new();
    button.add_css_class("loopstone-product");
    button.set_child(Some(&column));

    let id = product.id.clone();
    button.connect_clicked(move |button| {
        let Some((x, y)) = button.translate_coordinates(
            &reference,
            button.width() as f64 / 2.0,
            button.height() as f64 / 2.0,
        ) else {
            return;
        };
        sender.emit(AppMsg::ProductPicked(id.clone(), Point::new(x, y)));
    });

    button
}
