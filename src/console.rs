#[cfg(target_family = "wasm")]
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        #[wasm_bindgen]
        extern "C" {
            #[wasm_bindgen(js_namespace = console)]
            pub fn log(s: &str);

            #[wasm_bindgen(js_namespace = console)]
            pub fn warn(s: &str);
        }
    } else {
        pub fn log(s: &str) {
            println!("{} {}", timestamp(), s);
        }

        pub fn warn(s: &str) {
            eprintln!("{} WARN {}", timestamp(), s);
        }

        fn timestamp() -> String {
            chrono::Local::now().format("%H:%M:%S%.3f").to_string()
        }
    }
}

macro_rules! console_log {
    ($($t:tt)*) => (crate::console::log(&format_args!($($t)*).to_string()))
}

macro_rules! console_warn {
    ($($t:tt)*) => (crate::console::warn(&format_args!($($t)*).to_string()))
}

pub(crate) use console_log;
pub(crate) use console_warn;
