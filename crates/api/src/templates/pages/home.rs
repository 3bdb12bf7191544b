use maud::{html, Markup};

use crate::templates::layouts::{base, PageConfig};

pub fn home_page(routes: &[&str]) -> Markup {
    let config = PageConfig {
        title: "Climate API",
    };

    base(&config, content(routes))
}

fn content(routes: &[&str]) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5" { "Available Routes:" }
            ul {
                @for route in routes {
                    li {
                        a href=(route) { code { (route) } }
                    }
                }
            }
            p class="is-size-7 has-text-grey mt-4" {
                "Dates use the YYYY-MM-DD format."
            }
        }
    }
}
