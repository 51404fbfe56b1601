pub const TITLE_TEXT: &str = r#"
 ___ _                       
| __| |__ _ _ __ _ __ _  _   
| _|| / _` | '_ \ '_ \ || |  
|_| |_\__,_| .__/ .__/\_, |  
           |_|  |_|   |__/   
"#;

pub const OPTION_PADDING: usize = 2;
