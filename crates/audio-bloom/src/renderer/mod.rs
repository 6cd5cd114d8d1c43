mod canvas_view;

pub use canvas_view::draw_canvas;
