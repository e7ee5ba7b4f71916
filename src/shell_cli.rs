/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
use std::io::Write;
use std::io::{self, BufRead};
use std::fs::File;
use anyhow::Result;

pub trait ShellImpl {
    fn get_volume_name(&self) -> String;
    fn dir(&mut self, path: &str);
    fn is_directory(&mut self, path: &str) -> bool;
    fn retrieve_file_content(&mut self, path: &str) -> Result<Vec<u8>>;
    fn handle_command(&mut self, path: &str, fields: &Vec<&str>) -> bool;
}

fn join_path(pieces: &[String]) -> String {
    format!("/{}", pieces.join("/"))
}

pub fn run(shell: &mut impl ShellImpl) -> Result<()> {
    let mut current_directory: Vec<String> = vec![];

    let stdin = io::stdin();
    let mut input = stdin.lock().lines();
    loop {
        print!("{}:/{}> ", shell.get_volume_name(), current_directory.join("/"));
        io::stdout().flush()?;
        let line = input.next();
        if line.is_none() { break; }
        let line = line.unwrap();
        if line.is_err() { break; }
        let line = line.unwrap();

        let fields: Vec<_> = line.split_whitespace().collect();
        if fields.is_empty() { continue; }
        let command = *fields.first().unwrap();

        let directory = join_path(&current_directory);
        if shell.handle_command(&directory, &fields) {
            // Command accepted - nothing to do
        } else if command == "exit" || command == "quit" {
            break;
        } else if command == "cd" || command == "chdir" {
            if fields.len() != 2 {
                println!("usage: cd directory");
                continue;
            }
            let dest = fields[1];
            if dest != ".." {
                let new_directory: Vec<String> = if dest.starts_with('/') {
                    dest.split('/').filter(|s| !s.is_empty()).map(|s| s.to_string()).collect()
                } else {
                    let mut d = current_directory.clone();
                    d.extend(dest.split('/').filter(|s| !s.is_empty()).map(|s| s.to_string()));
                    d
                };
                if shell.is_directory(&join_path(&new_directory)) {
                    current_directory = new_directory;
                } else {
                    println!("Directory not found");
                }
            } else {
                current_directory.pop();
            }
        } else if command == "dir" || command == "ls" {
            shell.dir(&directory);
        } else if command == "get" {
            if fields.len() != 2 {
                println!("usage: get file");
                continue;
            }
            let fname = fields[1];
            match shell.retrieve_file_content(&format!("{}/{}", directory, fname)) {
                Ok(data) => {
                    let local = fname.rsplit('/').next().unwrap_or(fname);
                    File::create(local)
                        .and_then(|mut f| f.write(&data))
                        .unwrap_or_else(|e| { println!("error: {}", e); 0 } );
                }
                Err(e) => println!("error: {}", e),
            }
        } else if command == "cat" || command == "type" {
            if fields.len() != 2 {
                println!("usage: cat file");
                continue;
            }
            let fname = fields[1];
            match shell.retrieve_file_content(&format!("{}/{}", directory, fname)) {
                Ok(data) => {
                    if let Ok(s) = std::str::from_utf8(&data) {
                        println!("{}", s);
                    } else {
                        println!("{:x?}", data);
                    }
                }
                Err(e) => println!("error: {}", e),
            }
        } else {
            println!("unrecognized command");
        }
    }
    Ok(())
}
