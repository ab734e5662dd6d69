pub mod graphviz_svg;
